//! Date ranges for filtering the dashboard and transactions page.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, Month};

/// A named period relative to today, selected with the `range` query parameter.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateRangePreset {
    #[default]
    ThisMonth,
    LastMonth,
    LastThreeMonths,
    LastSixMonths,
    YearToDate,
    LastTwelveMonths,
}

impl DateRangePreset {
    /// Every preset, in the order they are shown in the range selector.
    pub const ALL: [DateRangePreset; 6] = [
        Self::ThisMonth,
        Self::LastMonth,
        Self::LastThreeMonths,
        Self::LastSixMonths,
        Self::YearToDate,
        Self::LastTwelveMonths,
    ];

    pub fn as_query_value(self) -> &'static str {
        match self {
            Self::ThisMonth => "this-month",
            Self::LastMonth => "last-month",
            Self::LastThreeMonths => "last-three-months",
            Self::LastSixMonths => "last-six-months",
            Self::YearToDate => "year-to-date",
            Self::LastTwelveMonths => "last-twelve-months",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ThisMonth => "This month",
            Self::LastMonth => "Last month",
            Self::LastThreeMonths => "Last 3 months",
            Self::LastSixMonths => "Last 6 months",
            Self::YearToDate => "Year to date",
            Self::LastTwelveMonths => "Last 12 months",
        }
    }

    /// The inclusive date range this preset covers when the current date is `today`.
    pub fn date_range(self, today: Date) -> DateRange {
        let (year, month) = (today.year(), today.month());

        match self {
            Self::ThisMonth => month_bounds(year, month),
            Self::LastMonth => {
                let (year, month) = months_before(year, month, 1);
                month_bounds(year, month)
            }
            Self::LastThreeMonths => trailing_months(today, 3),
            Self::LastSixMonths => trailing_months(today, 6),
            Self::YearToDate => DateRange {
                start: first_day_of_month(year, Month::January),
                end: today,
            },
            Self::LastTwelveMonths => trailing_months(today, 12),
        }
    }
}

/// An inclusive range of dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Query parameters for pages that can be filtered by a date range preset.
#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    /// The range preset to display, defaults to this month.
    pub range: Option<DateRangePreset>,
}

/// Text for showing a range to the user, e.g. "1 Mar 2025 - 31 Mar 2025".
pub fn range_label(range: DateRange) -> String {
    let start = format_date_label(range.start);
    let end = format_date_label(range.end);

    format!("{start} - {end}")
}

/// The first..=last day of `month` in `year`.
pub fn month_bounds(year: i32, month: Month) -> DateRange {
    DateRange {
        start: first_day_of_month(year, month),
        end: Date::from_calendar_date(year, month, last_day_of_month(year, month))
            .expect("invalid month end date"),
    }
}

/// The `month_count` whole calendar months up to and including today's month.
fn trailing_months(today: Date, month_count: u8) -> DateRange {
    let (start_year, start_month) = months_before(today.year(), today.month(), month_count - 1);

    DateRange {
        start: first_day_of_month(start_year, start_month),
        end: month_bounds(today.year(), today.month()).end,
    }
}

/// Step back `count` months from `month` in `year`, wrapping into previous years.
fn months_before(mut year: i32, mut month: Month, count: u8) -> (i32, Month) {
    for _ in 0..count {
        if month == Month::January {
            year -= 1;
        }

        month = month.previous();
    }

    (year, month)
}

fn first_day_of_month(year: i32, month: Month) -> Date {
    Date::from_calendar_date(year, month, 1).expect("invalid month start date")
}

pub fn last_day_of_month(year: i32, month: Month) -> u8 {
    match month {
        Month::January
        | Month::March
        | Month::May
        | Month::July
        | Month::August
        | Month::October
        | Month::December => 31,
        Month::April | Month::June | Month::September | Month::November => 30,
        Month::February => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn format_date_label(date: Date) -> String {
    format!(
        "{} {} {}",
        date.day(),
        month_abbrev(date.month()),
        date.year()
    )
}

pub fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// Links for switching between the range presets, with `selected` highlighted.
///
/// `preset_url` builds the link for a preset.
pub fn range_selector(
    selected: DateRangePreset,
    preset_url: impl Fn(DateRangePreset) -> String,
) -> Markup {
    html! {
        nav class="flex flex-wrap gap-2 text-sm" aria-label="Date range"
        {
            @for preset in DateRangePreset::ALL {
                @if preset == selected {
                    span
                        class="px-3 py-1 rounded-full bg-blue-500 text-white"
                        aria-current="true"
                        data-range-preset=(preset.as_query_value())
                    {
                        (preset.label())
                    }
                } @else {
                    a
                        href=(preset_url(preset))
                        class="px-3 py-1 rounded-full bg-gray-100 text-gray-700 hover:bg-gray-200
                            dark:bg-gray-700 dark:text-gray-200 dark:hover:bg-gray-600"
                        data-range-preset=(preset.as_query_value())
                    {
                        (preset.label())
                    }
                }
            }
        }
    }
}
