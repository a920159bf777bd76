//! Recognition results to fragments.
//!
//! A recognizer callback can carry several segments, some final, some still
//! interim. Final text always wins; interim text is only used when no segment
//! in the callback is final.

use serde::{Deserialize, Serialize};

/// One segment of a recognizer callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionResult {
    pub text: String,
    pub is_final: bool,
}

impl RecognitionResult {
    pub fn final_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: true,
        }
    }

    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final: false,
        }
    }
}

/// Text handed to the resolver for one callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub text: String,
    pub is_final: bool,
}

pub fn assemble(results: &[RecognitionResult]) -> Option<Fragment> {
    let mut final_text = String::new();
    let mut interim_text = String::new();

    for result in results {
        if result.is_final {
            final_text.push_str(&result.text);
            final_text.push(' ');
        } else {
            interim_text.push_str(&result.text);
        }
    }

    if !final_text.is_empty() {
        return Some(Fragment {
            text: final_text,
            is_final: true,
        });
    }
    if !interim_text.trim().is_empty() {
        return Some(Fragment {
            text: interim_text,
            is_final: false,
        });
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_segments_take_priority() {
        let results = vec![
            RecognitionResult::final_text("hola"),
            RecognitionResult::interim("que tal"),
            RecognitionResult::final_text("amigo"),
        ];
        let fragment = assemble(&results).unwrap();
        assert!(fragment.is_final);
        assert_eq!(fragment.text, "hola amigo ");
    }

    #[test]
    fn test_interim_used_when_no_final() {
        let results = vec![
            RecognitionResult::interim("que "),
            RecognitionResult::interim("tal"),
        ];
        let fragment = assemble(&results).unwrap();
        assert!(!fragment.is_final);
        assert_eq!(fragment.text, "que tal");
    }

    #[test]
    fn test_blank_interim_yields_nothing() {
        assert_eq!(assemble(&[RecognitionResult::interim("   ")]), None);
        assert_eq!(assemble(&[]), None);
    }
}
