//! Questionnaire page layout
//!
//! The 28 questions are shown in fixed pages of 7. Paging is presentation
//! only; the state machine never sees it.

use disc_common::disc::QUESTION_COUNT;
use serde::Serialize;

/// Questions shown per page
pub const QUESTIONS_PER_PAGE: u32 = 7;

/// Number of questionnaire pages
pub const TOTAL_PAGES: u32 = QUESTION_COUNT.div_ceil(QUESTIONS_PER_PAGE);

/// Layout of one questionnaire page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLayout {
    /// Current page number (1-indexed)
    pub page: u32,
    pub total_pages: u32,
    pub first_question: u32,
    pub last_question: u32,
    pub is_last_page: bool,
    /// Whole-number percentage of pages reached, this one included
    pub progress_percent: u32,
}

/// Layout for a requested page, clamped into `1..=TOTAL_PAGES`
///
/// # Examples
/// ```
/// use disc_at::pagination::page_layout;
///
/// let p = page_layout(2);
/// assert_eq!((p.first_question, p.last_question), (8, 14));
///
/// // Requesting out-of-bounds page gets clamped
/// let p = page_layout(99);
/// assert_eq!(p.page, 4);
/// assert!(p.is_last_page);
/// ```
pub fn page_layout(requested_page: i64) -> PageLayout {
    let page = requested_page.clamp(1, i64::from(TOTAL_PAGES)) as u32;
    let first_question = (page - 1) * QUESTIONS_PER_PAGE + 1;
    let last_question = (page * QUESTIONS_PER_PAGE).min(QUESTION_COUNT);
    let progress_percent = ((f64::from(page) / f64::from(TOTAL_PAGES)) * 100.0).round() as u32;

    PageLayout {
        page,
        total_pages: TOTAL_PAGES,
        first_question,
        last_question,
        is_last_page: page == TOTAL_PAGES,
        progress_percent,
    }
}
