/// Round `n` up to the closest multiple of `multiple` that is larger than or equal to `n`.
///
/// Zero stays zero, as the first member of a block starts at offset zero.
pub const fn align_up(n: u32, multiple: u32) -> u32 {
    debug_assert!(multiple != 0);
    if n % multiple == 0 {
        n
    } else {
        n + (multiple - (n % multiple))
    }
}

/// Round `n` up to the base alignment of a vec4.
pub const fn align16(n: u32) -> u32 {
    align_up(n, 16)
}

pub const fn max(a: u32, b: u32) -> u32 {
    if a > b {
        a
    } else {
        b
    }
}

/// Uppercase the first character, e.g. for deriving a GLSL struct type name from a variable name.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {

    #[test]
    fn test_round() {
        use super::align_up;

        let check = |x, m, e| {
            assert_eq!(align_up(x, m), e);
        };

        check(0, 100, 0);
        check(15, 100, 100);
        check(100, 100, 100);
        check(101, 100, 200);
        check(4, 7, 7);
        check(8, 7, 14);
        check(12, 16, 16);
        check(12, 4, 12);
        check(28, 8, 32);
    }

    #[test]
    fn test_align16() {
        use super::align16;

        assert_eq!(0, align16(0));
        assert_eq!(16, align16(1));
        assert_eq!(16, align16(16));
        assert_eq!(48, align16(33));
    }

    #[test]
    fn test_capitalize() {
        use super::capitalize;

        assert_eq!("Joint_transforms", capitalize("joint_transforms"));
        assert_eq!("F", capitalize("f"));
        assert_eq!("Already", capitalize("Already"));
        assert_eq!("", capitalize(""));
    }
}
