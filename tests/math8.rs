mod tests {
    use bcd_matrix_clock::math8::lerp8;

    #[test]
    fn test_lerp8_endpoints() {
        assert_eq!(lerp8(10, 200, 0, 10), 10);
        assert_eq!(lerp8(10, 200, 10, 10), 200);
        assert_eq!(lerp8(10, 200, 15, 10), 200);
    }

    #[test]
    fn test_lerp8_truncates() {
        assert_eq!(lerp8(0, 255, 1, 2), 127);
        assert_eq!(lerp8(0, 100, 1, 3), 33);
        // Descending rounds down too: 100 - 33.3 = 66.6
        assert_eq!(lerp8(100, 0, 1, 3), 66);
        assert_eq!(lerp8(100, 0, 2, 3), 33);
        assert_eq!(lerp8(255, 0, 1, 2), 127);
    }

    #[test]
    fn test_lerp8_zero_steps() {
        assert_eq!(lerp8(30, 60, 0, 0), 60);
    }

    #[test]
    fn test_lerp8_stays_between_endpoints() {
        for (a, b) in [(0u8, 255u8), (255, 0), (17, 18), (200, 3)] {
            let (low, high) = (a.min(b), a.max(b));
            for step in 0..=7 {
                let value = lerp8(a, b, step, 7);
                assert!(value >= low && value <= high);
            }
        }
    }
}
