use albumshuffle::utils::*;
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn test_shuffle_is_a_permutation() {
    let original: Vec<u32> = (0..100).collect();

    for seed in 0..20 {
        let mut shuffled = original.clone();
        shuffle_with(&mut shuffled, &mut StdRng::seed_from_u64(seed));

        assert_eq!(shuffled.len(), original.len());
        let mut sorted = shuffled.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, original);
    }
}

#[test]
fn test_shuffle_keeps_duplicates() {
    let original = vec!["a", "b", "b", "c", "c", "c"];
    let mut shuffled = original.clone();
    shuffle_with(&mut shuffled, &mut StdRng::seed_from_u64(7));

    let mut sorted = shuffled.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, original);
}

#[test]
fn test_shuffle_short_inputs_are_untouched() {
    let mut empty: Vec<u8> = Vec::new();
    shuffle_with(&mut empty, &mut StdRng::seed_from_u64(1));
    assert!(empty.is_empty());

    let mut single = vec![42];
    shuffle_with(&mut single, &mut StdRng::seed_from_u64(1));
    assert_eq!(single, vec![42]);

    let mut with_thread_rng = vec!["only"];
    shuffle(&mut with_thread_rng);
    assert_eq!(with_thread_rng, vec!["only"]);
}

#[test]
fn test_shuffle_is_reproducible_under_a_seed() {
    let mut a: Vec<u32> = (0..50).collect();
    let mut b = a.clone();
    shuffle_with(&mut a, &mut StdRng::seed_from_u64(99));
    shuffle_with(&mut b, &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
}

#[test]
fn test_shuffle_moves_elements() {
    // with 50 elements the chance of a seeded shuffle being the identity is nil
    let original: Vec<u32> = (0..50).collect();
    let mut shuffled = original.clone();
    shuffle_with(&mut shuffled, &mut StdRng::seed_from_u64(3));
    assert_ne!(shuffled, original);
}

#[test]
fn test_generate_session_id() {
    let id = generate_session_id();

    assert_eq!(id.len(), SESSION_ID_LEN);
    assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    assert!(is_valid_session_id(&id));

    // Two generated ids should be different
    assert_ne!(id, generate_session_id());
}

#[test]
fn test_is_valid_session_id_rejects_foreign_values() {
    assert!(!is_valid_session_id(""));
    assert!(!is_valid_session_id("short"));
    assert!(!is_valid_session_id(&"../".repeat(22)[..SESSION_ID_LEN]));
}

#[test]
fn test_session_key() {
    let id = generate_session_id();
    let key = session_key("pepper", &id);

    // Deterministic for the same secret and id
    assert_eq!(key, session_key("pepper", &id));

    // Secret and id both change the key
    assert_ne!(key, session_key("other", &id));
    assert_ne!(key, session_key("pepper", &generate_session_id()));

    // URL-safe base64 without padding, safe to use as a file name
    assert!(
        key.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    );
    assert!(!key.contains(&id));
}
