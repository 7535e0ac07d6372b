//! Declarative attribute -> taffy conversion.
//!
//! Maps the crate's style types ([`Length`], [`Edges`]) and the string-encoded
//! layout keywords (`flex-direction`, `justify-content`, grid track lists,
//! grid placements) to taffy's layout types.
//!
//! Keyword parsing is forgiving: both `center` and `centre` are accepted, and
//! anything unrecognised falls back to the taffy default rather than failing,
//! matching the crate-wide rule that malformed literals degrade to defaults.

use taffy::prelude::*;

use crate::geometry::Edges;
use crate::style::Length;

/// Convert a [`Length`] to a [`Dimension`] for sizing contexts.
pub fn dimension(length: Length) -> Dimension {
    match length {
        Length::Pixels(px) => Dimension::from_length(px),
        Length::Percent(pc) => Dimension::from_percent(pc / 100.0),
        Length::Auto => Dimension::AUTO,
    }
}

/// Convert 4-sided [`Edges`] to a margin rect.
pub fn margin(edges: Edges) -> taffy::geometry::Rect<LengthPercentageAuto> {
    taffy::geometry::Rect {
        top: LengthPercentageAuto::from_length(edges.top),
        right: LengthPercentageAuto::from_length(edges.right),
        bottom: LengthPercentageAuto::from_length(edges.bottom),
        left: LengthPercentageAuto::from_length(edges.left),
    }
}

/// `row`, `row-reverse`, `column`, `column-reverse`. Defaults to column.
pub fn flex_direction(keyword: &str) -> FlexDirection {
    match keyword {
        "row" => FlexDirection::Row,
        "row-reverse" => FlexDirection::RowReverse,
        "column-reverse" => FlexDirection::ColumnReverse,
        _ => FlexDirection::Column,
    }
}

/// `nowrap`, `wrap`, `wrap-reverse`. Defaults to nowrap.
pub fn flex_wrap(keyword: &str) -> FlexWrap {
    match keyword {
        "wrap" => FlexWrap::Wrap,
        "wrap-reverse" => FlexWrap::WrapReverse,
        _ => FlexWrap::NoWrap,
    }
}

pub fn justify_content(keyword: &str) -> Option<JustifyContent> {
    match keyword {
        "flex-start" | "start" => Some(JustifyContent::FlexStart),
        "flex-end" | "end" => Some(JustifyContent::FlexEnd),
        "centre" | "center" => Some(JustifyContent::Center),
        "space-between" => Some(JustifyContent::SpaceBetween),
        "space-around" => Some(JustifyContent::SpaceAround),
        "space-evenly" => Some(JustifyContent::SpaceEvenly),
        _ => None,
    }
}

pub fn align_items(keyword: &str) -> Option<AlignItems> {
    match keyword {
        "flex-start" | "start" => Some(AlignItems::FlexStart),
        "flex-end" | "end" => Some(AlignItems::FlexEnd),
        "centre" | "center" => Some(AlignItems::Center),
        "baseline" => Some(AlignItems::Baseline),
        "stretch" => Some(AlignItems::Stretch),
        _ => None,
    }
}

pub fn align_content(keyword: &str) -> Option<AlignContent> {
    match keyword {
        "flex-start" | "start" => Some(AlignContent::FlexStart),
        "flex-end" | "end" => Some(AlignContent::FlexEnd),
        "centre" | "center" => Some(AlignContent::Center),
        "stretch" => Some(AlignContent::Stretch),
        "space-between" => Some(AlignContent::SpaceBetween),
        "space-around" => Some(AlignContent::SpaceAround),
        "space-evenly" => Some(AlignContent::SpaceEvenly),
        _ => None,
    }
}

/// Parse a `gap` shorthand: one value for both axes, or `row column`.
pub fn gap(text: &str) -> taffy::geometry::Size<LengthPercentage> {
    let mut parts = text.split_whitespace().map(gap_component);
    let row = parts.next().flatten().unwrap_or(0.0);
    let column = parts.next().flatten().unwrap_or(row);
    taffy::geometry::Size {
        width: LengthPercentage::from_length(column),
        height: LengthPercentage::from_length(row),
    }
}

fn gap_component(token: &str) -> Option<f32> {
    match Length::parse(token)? {
        Length::Pixels(px) => Some(px),
        _ => None,
    }
}

/// Parse a whitespace-separated track list such as `"100px 1fr auto"`.
pub fn grid_tracks(list: &str) -> Vec<taffy::GridTemplateComponent<String>> {
    list.split_whitespace()
        .filter_map(grid_track)
        .map(taffy::GridTemplateComponent::Single)
        .collect()
}

fn grid_track(token: &str) -> Option<TrackSizingFunction> {
    if token == "auto" {
        return Some(auto());
    }
    if token == "min-content" {
        return Some(min_content());
    }
    if token == "max-content" {
        return Some(max_content());
    }
    if let Some(value) = token.strip_suffix("fr") {
        return value.parse::<f32>().ok().map(flex);
    }
    if let Some(value) = token.strip_suffix('%') {
        return value.parse::<f32>().ok().map(|pc| percent(pc / 100.0));
    }
    let value = token.strip_suffix("px").unwrap_or(token);
    value.parse::<f32>().ok().map(length)
}

/// Parse a grid placement: `"2"`, `"1 / 3"`, or `"span 2"`.
pub fn grid_placement(text: &str) -> taffy::geometry::Line<taffy::GridPlacement> {
    let mut parts = text.splitn(2, '/').map(str::trim);
    let start = parts.next().map(single_placement).unwrap_or(taffy::GridPlacement::Auto);
    let end = parts.next().map(single_placement).unwrap_or(taffy::GridPlacement::Auto);
    taffy::geometry::Line { start, end }
}

fn single_placement(token: &str) -> taffy::GridPlacement {
    if let Some(count) = token.strip_prefix("span") {
        return count
            .trim()
            .parse::<u16>()
            .map(taffy::GridPlacement::Span)
            .unwrap_or(taffy::GridPlacement::Auto);
    }
    token
        .parse::<i16>()
        .map(taffy::GridPlacement::from_line_index)
        .unwrap_or(taffy::GridPlacement::Auto)
}
