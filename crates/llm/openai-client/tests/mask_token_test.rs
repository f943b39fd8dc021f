//! Tests for [`openai_client::mask_token`], used whenever an API key reaches the logs.

use openai_client::mask_token;

/// **Test: keys of 11 characters or fewer never show any segment.**
#[test]
fn short_keys_are_fully_masked() {
    for key in ["", "a", "sk-12345", "sk-proj-12", "sk-proj-123"] {
        assert_eq!(mask_token(key), "***", "key {:?}", key);
    }
}

/// **Test: longer keys keep the first 7 and last 4 characters only.**
#[test]
fn long_keys_keep_head_and_tail() {
    assert_eq!(mask_token("sk-proj-xyzw"), "sk-proj***xyzw");
    let masked = mask_token("sk-proj-1234567890abcdefghijklmnopqrstuvwxyz");
    assert_eq!(masked, "sk-proj***wxyz");
    assert_eq!(masked.len(), 14);
}

/// **Test: non-ASCII input is masked entirely instead of being sliced mid-character.**
#[test]
fn non_ascii_keys_are_fully_masked() {
    assert_eq!(mask_token("ключ-ключ-ключ-ключ"), "***");
}
