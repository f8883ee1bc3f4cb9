use super::space::{in_half_open_right, in_open, KeySpace};
use super::types::NodeAddress;

#[test]
fn open_interval_plain() {
    assert!(in_open(2, 5, 9));
    assert!(!in_open(2, 2, 9));
    assert!(!in_open(2, 9, 9));
    assert!(!in_open(2, 1, 9));
    assert!(!in_open(2, 12, 9));
}

#[test]
fn open_interval_wraparound() {
    // Arc (12, 3) on a 16-id ring passes through 0.
    assert!(in_open(12, 14, 3));
    assert!(in_open(12, 0, 3));
    assert!(in_open(12, 2, 3));
    assert!(!in_open(12, 3, 3));
    assert!(!in_open(12, 12, 3));
    assert!(!in_open(12, 7, 3));
}

#[test]
fn open_interval_degenerate_is_empty() {
    for x in 0..16 {
        assert!(!in_open(5, x, 5), "in_open(5, {}, 5) must be empty", x);
    }
}

#[test]
fn half_open_interval_plain() {
    assert!(in_half_open_right(2, 5, 9));
    assert!(in_half_open_right(2, 9, 9));
    assert!(!in_half_open_right(2, 2, 9));
    assert!(!in_half_open_right(2, 10, 9));
}

#[test]
fn half_open_interval_wraparound() {
    assert!(in_half_open_right(12, 0, 3));
    assert!(in_half_open_right(12, 3, 3));
    assert!(in_half_open_right(12, 15, 3));
    assert!(!in_half_open_right(12, 12, 3));
    assert!(!in_half_open_right(12, 7, 3));
}

#[test]
fn half_open_interval_degenerate_is_ring_minus_endpoint() {
    for x in 0..16 {
        assert_eq!(in_half_open_right(5, x, 5), x != 5);
    }
}

#[test]
fn right_endpoint_always_inside_half_open() {
    // in_half_open_right(a, b, b) holds for every a != b.
    for a in 0..16 {
        for b in 0..16u64 {
            if a != b {
                assert!(in_half_open_right(a, b, b), "({}, {}] must contain {}", a, b, b);
            }
        }
    }
}

#[test]
fn open_never_contains_right_endpoint() {
    for a in 0..16 {
        for b in 0..16u64 {
            assert!(!in_open(a, b, b));
        }
    }
}

#[test]
fn hash_stays_in_domain() {
    for bits in [1u32, 3, 4, 8, 16] {
        let space = KeySpace::new(bits).unwrap();
        for i in 0..500 {
            let id = space.hash(&format!("key-{}", i));
            assert!(id < space.size(), "hash escaped [0, 2^{})", bits);
        }
    }
}

#[test]
fn hash_is_deterministic() {
    let space = KeySpace::new(16).unwrap();
    assert_eq!(space.hash("foo"), space.hash("foo"));
}

#[test]
fn hash_reduces_modulo_power_of_two() {
    // The same key under a wider space, reduced again, matches the
    // narrow space: reduction is mod 2^m, never mod (2^m - 1).
    let narrow = KeySpace::new(4).unwrap();
    let wide = KeySpace::new(16).unwrap();
    for key in ["foo", "bar", "chord", "node-7"] {
        assert_eq!(wide.hash(key) % narrow.size(), narrow.hash(key));
    }
}

#[test]
fn finger_starts_wrap() {
    let space = KeySpace::new(4).unwrap();
    assert_eq!(space.finger_start(0, 0), 1);
    assert_eq!(space.finger_start(0, 3), 8);
    assert_eq!(space.finger_start(12, 3), 4);
    assert_eq!(space.finger_start(15, 0), 0);
}

#[test]
fn space_bounds_are_enforced() {
    assert!(KeySpace::new(0).is_err());
    assert!(KeySpace::new(KeySpace::MAX_BITS + 1).is_err());
    assert_eq!(KeySpace::new(3).unwrap().size(), 8);
}

#[test]
fn node_address_equality_is_by_address() {
    let a = NodeAddress::new(1, "127.0.0.1:4000");
    let b = NodeAddress::new(9, "127.0.0.1:4000");
    let c = NodeAddress::new(1, "127.0.0.1:4001");
    assert_eq!(a, b);
    assert_ne!(a, c);
}
