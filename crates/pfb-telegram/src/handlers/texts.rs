//! Static replies.

pub const WELCOME: &str = "Welcome! Send me a movie or TV show name to get started.\n\nE.g., `The Matrix 1999`";

pub const YEAR_HINT: &str = "Please include the year for better results (e.g., `Inception 2010`).";

pub const MISSING_ID: &str =
    "The search was successful, but the result is missing a required ID. Please try another query.";

pub fn not_found(query: &str) -> String {
    format!("😕 Sorry, couldn't find anything for '{query}'. Please check the spelling and year.")
}

pub fn search_failed(err: &impl std::fmt::Display) -> String {
    format!("An error occurred during the search: {err}")
}

pub const ABOUT: &str = "
*About PosterFlix*

This bot allows you to preview and download official movie and TV show posters and backdrops from The Movie Database (TMDB).

Using TMDB's powerful API, PosterFlix provides lightning-fast access to high-quality artwork.

*Features include:*
• High-resolution image access
• Multi-language support
• Smart search functionality
";

pub const FAQ: &str = "
*Frequently Asked Questions*

*Q: Do you host any images?*
A: No, all images are fetched directly from TMDB's servers in real-time for maximum freshness and legal compliance.

*Q: Is this bot affiliated with TMDB?*
A: This is an independent project using TMDB's public API and is not officially endorsed by TMDB.

*Q: How often is the database updated?*
A: Data is fetched live from TMDB, ensuring you always get the latest available content.
";

pub const DISCLAIMER: &str = "
*Legal Disclaimer*

This bot uses the TMDB API but is not endorsed or certified by TMDB. All images, trademarks, and copyrighted material belong to their respective owners.

This service is designed for personal, non-commercial use only.
";
