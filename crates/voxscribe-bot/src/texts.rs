//! User-facing message texts (Telegram legacy Markdown).

pub(crate) const HELP: &str = "📘 *How to use this bot:*\n
1️⃣ Forward me any *audio file* (voice note, music, or speech).\n
2️⃣ Wait a few seconds while I transcribe it ⏳\n
3️⃣ I'll reply with the *text version* of your recording.";

pub(crate) const ABOUT: &str = "🤖 *About the Bot:*\n
Can't listen to that voice message right now? 🤫\n
Forward it to me, along with any other audio (voice notes, music clips, or files), and I'll turn the sound into *readable text*. 📝\n
Never miss a word, even somewhere noisy or quiet. 🚀";

pub(crate) const PROCESSING: &str = "🎧 Got your audio! Processing, wait a moment...";

pub(crate) const UNSUPPORTED: &str = "❌ *Unsupported File Type.* Please send a valid audio message, voice note, or a document with an audio mime type.";

pub(crate) const NO_SPEECH: &str = "❌ *Transcription Failed.* I couldn't detect clear speech in your recording or the audio quality was too low.";

pub(crate) const UNKNOWN_ERROR: &str = "⚠️ *Unexpected Error.* Failed to process your audio message due to an internal server error. Please try again later.";

pub(crate) const SERVICE_ERROR: &str = "🚨 *Service Error.* The transcription service failed to process the request. The audio file might be corrupted or too long.";

pub(crate) const DOWNLOAD_ERROR: &str = "⚠️ *Download Error.* Failed to fetch the file from Telegram.";

pub(crate) const MESSAGE_TOO_LONG: &str = "🛑 Message too long to process";

pub(crate) const ONLY_AUDIO: &str =
    "🤖 I only understand *audio messages*! Please send a voice note or audio file 🎤";

pub(crate) const TRANSCRIBE_ANOTHER_BUTTON: &str = "🔁 Transcribe Another";
pub(crate) const HELP_BUTTON: &str = "ℹ️ Help";
pub(crate) const ABOUT_BUTTON: &str = "📝 About";

pub(crate) fn welcome(first_name: Option<&str>) -> String {
    let name = first_name
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or("there");
    format!(
        "👋 Welcome, *{}*! I'm your *Voice Transcriber Bot* 🗣️\n\
         *Forward* me a voice message, music clip, or audio file and I'll convert it to text for you.",
        escape_markdown(name)
    )
}

pub(crate) fn transcribed(text: &str) -> String {
    format!("🗣️ *Transcribed Text:*\n\n{}", escape_markdown(text))
}

/// Escapes the entity characters of Telegram's legacy Markdown.
pub(crate) fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
