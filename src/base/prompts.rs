//! User-visible reply templates and generative directives.
//!
//! The bot speaks Japanese to its users; every canned string lives here so
//! wording changes never touch handler logic.

/// Reaction added while a dispatched event is being handled.
pub const THINKING_REACTION: &str = "hourglass_flowing_sand";

/// Acknowledgement posted before a text or analysis call.
pub const THINKING_ACK: &str = "🤔 子分1号が考え中...";

/// Reply when a mention carries no usable prompt.
pub const EMPTY_PROMPT_REPLY: &str = "何かメッセージを入力してください！";

/// Reply when an image command carries no description.
pub const EMPTY_IMAGE_PROMPT_REPLY: &str = "画像の説明を入力してください。例: `/image 美しい夕焼けの海岸`";

/// Reply when an image was expected but none of the attachments is one.
pub const ATTACH_IMAGE_REPLY: &str = "画像ファイルを添付してください。";

/// Generic apology for unexpected failures.
pub const GENERIC_FAILURE_REPLY: &str = "エラーが発生しました。もう一度お試しください。";

/// Apology specific to the image slash command.
pub const IMAGE_COMMAND_FAILURE_REPLY: &str = "画像生成中にエラーが発生しました。";

/// Reply to a slash command nobody taught us.
pub const UNKNOWN_COMMAND_REPLY: &str = "不明なコマンドです。";

/// Corrective reply when the text slash command has no question.
pub const EMPTY_COMMAND_PROMPT_REPLY: &str = "質問を入力してください。例: `/gemini 今日の天気は？`";

/// Label prefixed to a textual description sent in place of an image.
pub const IMAGE_FALLBACK_PREFIX: &str = "⚠️ 画像生成機能は現在利用できません。代わりに説明を生成しました:\n\n";

/// Filename used for uploaded generations.
pub const GENERATED_IMAGE_FILENAME: &str = "generated-image.png";

/// Directive for describing an image that could not be generated.
pub const IMAGE_DESCRIPTION_DIRECTIVE: &str =
    "あなたは画像の説明を生成するAIです。以下のプロンプトに基づいて、詳細な画像の説明を日本語で書いてください: ";

/// Directive for describing how reference images would be transformed.
pub const TRANSFORM_DESCRIPTION_DIRECTIVE: &str =
    "参考画像をもとに、どのような画像に仕上がるかを日本語で詳しく説明してください。指示: ";

/// Default prompt when an image arrives with no accompanying text.
pub const DEFAULT_ANALYSIS_PROMPT: &str = "この画像について詳しく説明してください。";

/// Acknowledgement for image generation, with the creative prompt echoed.
pub fn image_ack(prompt: &str) -> String {
    format!("🎨 子分1号が画像を生成中... 「{prompt}」")
}

/// Caption attached to an uploaded generation.
pub fn image_caption(prompt: &str) -> String {
    format!("生成画像: {prompt}")
}

/// Delayed confirmation once an image upload completed.
pub fn image_uploaded(prompt: &str) -> String {
    format!("✅ 画像を生成しました: 「{prompt}」")
}
