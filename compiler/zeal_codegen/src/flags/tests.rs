use pretty_assertions::assert_eq;

use super::*;

#[test]
fn renders_single_flags() {
    assert_eq!(AccessFlags::NOISY.render(), "PH_NOISY_CC");
    assert_eq!(AccessFlags::SEPARATE.render(), "PH_SEPARATE");
    assert_eq!(AccessFlags::empty().render(), "0");
}

#[test]
fn renders_combinations_in_fixed_order() {
    let flags = AccessFlags::READONLY | AccessFlags::NOISY;
    assert_eq!(flags.render(), "PH_NOISY_CC | PH_READONLY");
    let flags = AccessFlags::COPY | AccessFlags::SEPARATE;
    assert_eq!(flags.render(), "PH_SEPARATE | PH_COPY");
}
