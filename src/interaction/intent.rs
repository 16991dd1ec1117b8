//! Intent classification for dispatched events.
//!
//! Classification runs over an explicit, ordered table of trigger phrases.
//! The phrase sets and the priority order are independent: either can be
//! extended without touching the dispatch logic in [`classify`].

use crate::base::types::Intent;

/// Phrases signalling that attached images should be transformed.
pub const TRANSFORMATION_PHRASES: &[&str] = &[
    "この画像を参考に",
    "参考にして",
    "をもとに",
    "based on this",
    "in the style of",
    "風に",
    "リミックス",
    "remix",
    "アレンジ",
    "arrange",
];

/// Slash commands that explicitly request a transformation.
pub const TRANSFORMATION_COMMANDS: &[&str] = &["/remix", "/style", "/create"];

/// Prefixes that force the image-generation path.
pub const GENERATION_PREFIXES: &[&str] = &["/image ", "画像生成:", "画像:"];

/// Phrases that request image generation in free text.
pub const GENERATION_PHRASES: &[&str] = &[
    "画像生成",
    "画像を生成",
    "絵を描いて",
    "generate an image",
    "draw a picture",
];

/// Deliverables whose production implies an image result.
pub const PRODUCTION_SUBJECTS: &[&str] = &["バナー", "ポスター", "デザイン", "banner", "poster", "design"];

/// Verbs that, combined with a production subject, request creation.
pub const PRODUCTION_VERBS: &[&str] = &["作って", "作成", "つくって", "make", "create"];

/// Select the handling strategy for one event.
///
/// Evaluation order, first match wins:
/// 1. attachments plus transformation language;
/// 2. generation commands or phrasing;
/// 3. attachments alone;
/// 4. plain text.
///
/// Attachment-plus-transformation outranks generation phrasing so that a
/// caption like 「この画像を参考にしてバナーを作って」 stays on the
/// image-to-image path instead of plain text-to-image.
pub fn classify(text: &str, has_attachments: bool) -> Intent {
    let lower = text.to_lowercase();

    if has_attachments && wants_transformation(&lower) {
        return Intent::ImageToImage;
    }

    if wants_generation(&lower) {
        return Intent::ImageGeneration;
    }

    if has_attachments {
        return Intent::ImageAnalysis;
    }

    Intent::TextReply
}

fn wants_transformation(lower: &str) -> bool {
    TRANSFORMATION_PHRASES.iter().any(|p| lower.contains(p))
        || TRANSFORMATION_COMMANDS.iter().any(|c| lower.starts_with(c))
        || wants_production(lower)
}

fn wants_generation(lower: &str) -> bool {
    GENERATION_PREFIXES.iter().any(|p| lower.starts_with(p))
        || GENERATION_PHRASES.iter().any(|p| lower.contains(p))
        || wants_production(lower)
}

fn wants_production(lower: &str) -> bool {
    PRODUCTION_SUBJECTS.iter().any(|s| lower.contains(s)) && PRODUCTION_VERBS.iter().any(|v| lower.contains(v))
}

/// Strip the bot's own mention markup and surrounding whitespace.
pub fn normalize(text: &str, bot_user_id: &str) -> String {
    if bot_user_id.is_empty() {
        return text.trim().to_string();
    }

    text.replace(&format!("<@{bot_user_id}>"), "").trim().to_string()
}

/// Isolate the creative prompt of a generation request.
///
/// Falls back to the unstripped text when stripping would empty it.
pub fn creative_prompt(text: &str) -> String {
    let trimmed = text.trim();

    for prefix in GENERATION_PREFIXES {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            let rest = rest.trim();
            if rest.is_empty() {
                break;
            }
            return rest.to_string();
        }
    }

    trimmed.to_string()
}

/// Isolate the creative prompt of a transformation request.
pub fn transformation_prompt(text: &str) -> String {
    let trimmed = text.trim();

    for command in TRANSFORMATION_COMMANDS {
        if let Some(rest) = trimmed.strip_prefix(command) {
            let rest = rest.trim();
            if rest.is_empty() {
                break;
            }
            return rest.to_string();
        }
    }

    trimmed.to_string()
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_with_production_verb_is_image_to_image() {
        assert_eq!(classify("この画像を参考にしてバナーを作って", true), Intent::ImageToImage);
    }

    #[test]
    fn generation_phrase_without_attachment_is_image_generation() {
        assert_eq!(classify("画像生成して: 夕焼けの海岸", false), Intent::ImageGeneration);
    }

    #[test]
    fn attachment_without_keywords_is_image_analysis() {
        assert_eq!(classify("これは何ですか？", true), Intent::ImageAnalysis);
    }

    #[test]
    fn plain_text_is_text_reply() {
        assert_eq!(classify("今日の天気は？", false), Intent::TextReply);
    }

    #[test]
    fn empty_text_without_attachments_is_text_reply() {
        assert_eq!(classify("", false), Intent::TextReply);
    }

    #[test]
    fn transformation_outranks_generation_when_attachments_present() {
        // Both phrase sets match; the attachment decides the winner.
        assert_eq!(classify("この画像を参考に画像生成して", true), Intent::ImageToImage);
        assert_eq!(classify("この画像を参考に画像生成して", false), Intent::ImageGeneration);
    }

    #[test]
    fn slash_remix_with_attachment_is_image_to_image() {
        assert_eq!(classify("/remix 夜の街並みに", true), Intent::ImageToImage);
    }

    #[test]
    fn image_prefix_is_image_generation() {
        assert_eq!(classify("/image a red bicycle", false), Intent::ImageGeneration);
    }

    #[test]
    fn production_without_attachment_is_image_generation() {
        assert_eq!(classify("新商品のポスターを作成してください", false), Intent::ImageGeneration);
    }

    #[test]
    fn english_generation_phrase_matches_case_insensitively() {
        assert_eq!(classify("Generate an image of a cat", false), Intent::ImageGeneration);
    }

    #[test]
    fn normalize_strips_mention_markup() {
        assert_eq!(normalize("<@U12345> こんにちは", "U12345"), "こんにちは");
        assert_eq!(normalize("  hello  ", ""), "hello");
        assert_eq!(normalize("<@U12345>", "U12345"), "");
    }

    #[test]
    fn creative_prompt_strips_prefixes() {
        assert_eq!(creative_prompt("/image 美しい夕焼けの海岸"), "美しい夕焼けの海岸");
        assert_eq!(creative_prompt("画像生成: 夕焼け"), "夕焼け");
        assert_eq!(creative_prompt("画像: 夕焼け"), "夕焼け");
    }

    #[test]
    fn creative_prompt_falls_back_when_stripping_empties() {
        assert_eq!(creative_prompt("画像生成:"), "画像生成:");
    }

    #[test]
    fn creative_prompt_passes_free_text_through() {
        assert_eq!(creative_prompt("画像生成して: 夕焼けの海岸"), "画像生成して: 夕焼けの海岸");
    }

    #[test]
    fn transformation_prompt_strips_commands() {
        assert_eq!(transformation_prompt("/remix 夜の街並みに"), "夜の街並みに");
        assert_eq!(transformation_prompt("/style watercolor"), "watercolor");
        assert_eq!(transformation_prompt("/remix"), "/remix");
    }
}
