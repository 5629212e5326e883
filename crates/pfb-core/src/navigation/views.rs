//! Pure renderers for each navigation screen.

use crate::{
    media::MediaRecord,
    messaging::types::{InlineButton, InlineKeyboard},
    navigation::token::NavToken,
};

/// Captions are capped at 1024 chars by the platform; the plot gets at most this much.
const MAIN_PLOT_CHARS: usize = 800;
/// Details carry more fields around the plot, so it gets less room there.
const DETAILS_PLOT_CHARS: usize = 500;
const DETAILS_TAGLINE_CHARS: usize = 150;

const NA: &str = "N/A";

fn button(label: impl Into<String>, token: NavToken) -> InlineButton {
    if !token.fits_button() {
        tracing::warn!(token = %token, "navigation token exceeds button data limit");
    }
    InlineButton::callback(label, token)
}

fn back_to_main(media_id: &str) -> InlineButton {
    button("« Back to Main Menu", NavToken::back_to_main(media_id))
}

/// Clamp a requested index into `[0, total - 1]`. `total` must be at least 1.
pub fn effective_index(requested: i64, total: usize) -> usize {
    let last = total.saturating_sub(1) as i64;
    requested.clamp(0, last) as usize
}

/// Button label for a language code.
pub fn language_label(lang: &str) -> String {
    if lang.chars().count() == 2 {
        lang.to_uppercase()
    } else {
        "No Language".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

// ============== MAIN_MENU ==============

pub fn main_caption(record: &MediaRecord) -> String {
    let title = record.title.as_deref().unwrap_or(NA);
    let year = record
        .year
        .as_ref()
        .map(|y| y.to_string())
        .unwrap_or_else(|| NA.to_string());
    let plot = truncate(
        record.plot.as_deref().unwrap_or("No summary available."),
        MAIN_PLOT_CHARS,
    );
    format!("🎬 *{title}* ({year})\n\n{plot}")
}

pub fn main_keyboard(media_id: &str) -> InlineKeyboard {
    InlineKeyboard::default()
        .row(vec![
            button("🖼️ View Posters", NavToken::view("posters", media_id)),
            button("🏞️ View Backdrops", NavToken::view("backdrops", media_id)),
        ])
        .row(vec![button("ℹ️ Full Details", NavToken::details(media_id))])
}

// ============== LANGUAGE_SELECT ==============

pub fn language_caption(record: &MediaRecord, media_type: &str) -> String {
    format!(
        "Select a language for *{}* {}:",
        record.title.as_deref().unwrap_or(NA),
        capitalize(media_type)
    )
}

/// One row per language (sorted), then the way back to the main menu.
pub fn language_keyboard(record: &MediaRecord, media_type: &str, media_id: &str) -> InlineKeyboard {
    let mut kb = InlineKeyboard::default();
    for (lang, count) in record.languages(media_type) {
        kb = kb.row(vec![button(
            format!("{} ({count})", language_label(lang)),
            NavToken::page(media_type, lang, 0, media_id),
        )]);
    }
    kb.row(vec![back_to_main(media_id)])
}

// ============== IMAGE_VIEW ==============

#[derive(Clone, Debug, PartialEq)]
pub struct ImagePage {
    pub url: String,
    /// Zero-based effective index.
    pub index: usize,
    pub total: usize,
    pub keyboard: InlineKeyboard,
}

/// Render one image of a selection, or `None` when the selection has no images.
pub fn image_page(
    record: &MediaRecord,
    media_type: &str,
    lang: &str,
    requested: i64,
    media_id: &str,
) -> Option<ImagePage> {
    let images = record.images_for(media_type, lang);
    if images.is_empty() {
        return None;
    }
    let total = images.len();
    let index = effective_index(requested, total);

    let mut controls = Vec::with_capacity(3);
    if index > 0 {
        controls.push(button(
            "⬅️ Prev",
            NavToken::page(media_type, lang, index as i64 - 1, media_id),
        ));
    }
    controls.push(button(format!("{}/{total}", index + 1), NavToken::Noop));
    if index + 1 < total {
        controls.push(button(
            "Next ➡️",
            NavToken::page(media_type, lang, index as i64 + 1, media_id),
        ));
    }

    let keyboard = InlineKeyboard::default().row(controls).row(vec![button(
        "« Back to Languages",
        NavToken::view(media_type, media_id),
    )]);

    Some(ImagePage {
        url: images[index].clone(),
        index,
        total,
        keyboard,
    })
}

/// Text rendering of an image page, for menus that live on a text message.
/// The link preview shows the image.
pub fn image_link(url: &str, index: usize, total: usize) -> String {
    format!("🖼️ [Image {}/{total}]({url})", index + 1)
}

// ============== DETAILS ==============

pub fn details_caption(record: &MediaRecord) -> String {
    let show = |v: &Option<crate::media::DisplayValue>| {
        v.as_ref().map(|v| v.to_string()).unwrap_or_else(|| NA.to_string())
    };
    format!(
        "🎬 *{title}* ({year})\n\n\
         *{tagline}*\n\n\
         📖 *Plot:* {plot}\n\n\
         ⭐ *Rating:* {rating} ({votes} votes)\n\
         🕒 *Runtime:* {runtime}\n\
         🎭 *Genres:* {genres}\n\n\
         🔗 [View on TMDB]({url})",
        title = record.title.as_deref().unwrap_or(NA),
        year = show(&record.year),
        tagline = truncate(record.tagline.as_deref().unwrap_or(""), DETAILS_TAGLINE_CHARS),
        plot = truncate(record.plot.as_deref().unwrap_or(NA), DETAILS_PLOT_CHARS),
        rating = show(&record.rating),
        votes = show(&record.votes),
        runtime = show(&record.runtime),
        genres = show(&record.genres),
        url = record.url.as_deref().unwrap_or(""),
    )
}

pub fn details_keyboard(media_id: &str) -> InlineKeyboard {
    InlineKeyboard::default().row(vec![back_to_main(media_id)])
}
