//! Spending-by-category pie chart on the dashboard.

use std::f64::consts::{PI, TAU};

use serde::Deserialize;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::budget::round_percent;
use crate::currency::{CurrencyCode, CurrencyFormatter};
use crate::error::RequestError;
use crate::http;

pub const HOST_ID: &str = "categoryPieChart";
pub const DATA_ENDPOINT: &str = "/api/chart_data";

pub const PALETTE: [&str; 11] = [
    "#4dc9f6", "#f67019", "#f53794", "#537bc4", "#acc236", "#166a8f", "#00a950", "#58595b",
    "#8549ba", "#a4e43f", "#df5e88",
];

const SLICE_BORDER: &str = "rgba(255, 255, 255, 0.5)";
const VIEW_SIZE: f64 = 200.0;
const RADIUS: f64 = 98.0;

/// One row of `/api/chart_data`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChartDatum {
    pub category: String,
    pub amount: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub amount: f64,
    pub color: &'static str,
    /// Radians, clockwise from 12 o'clock.
    pub start: f64,
    pub end: f64,
    /// Rounded share of the total, in percent.
    pub share: i64,
}

impl PieSlice {
    pub fn is_visible(&self) -> bool {
        self.end > self.start
    }

    pub fn is_full_circle(&self) -> bool {
        self.end - self.start >= TAU - 1e-9
    }

    pub fn tooltip(&self, formatter: &CurrencyFormatter) -> String {
        format!(
            "{}: {} ({}%)",
            self.label,
            formatter.format(self.amount),
            self.share
        )
    }
}

/// Upper-cases the first character only.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lays the categories out around the circle in the order received.
///
/// Negative totals are listed but take no room on the circle.
pub fn build_slices(data: &[ChartDatum]) -> Vec<PieSlice> {
    let total: f64 = data.iter().map(|d| d.amount).sum();
    let drawn_total: f64 = data.iter().map(|d| d.amount.max(0.0)).sum();

    let mut angle = 0.0;
    data.iter()
        .enumerate()
        .map(|(i, datum)| {
            let sweep = if drawn_total > 0.0 {
                datum.amount.max(0.0) / drawn_total * TAU
            } else {
                0.0
            };
            let share = if total > 0.0 {
                round_percent(datum.amount / total * 100.0)
            } else {
                0
            };
            let slice = PieSlice {
                label: capitalize(&datum.category),
                amount: datum.amount,
                color: PALETTE[i % PALETTE.len()],
                start: angle,
                end: angle + sweep,
                share,
            };
            angle += sweep;
            slice
        })
        .collect()
}

fn point_on_circle(cx: f64, cy: f64, r: f64, angle: f64) -> (f64, f64) {
    (cx + r * angle.sin(), cy - r * angle.cos())
}

/// SVG path for a wedge from `start` to `end` (radians from 12 o'clock).
pub fn arc_path(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> String {
    let (x1, y1) = point_on_circle(cx, cy, r, start);
    let (x2, y2) = point_on_circle(cx, cy, r, end);
    let large_arc = if end - start > PI { 1 } else { 0 };
    format!(
        "M{cx:.3} {cy:.3} L{x1:.3} {y1:.3} A{r:.3} {r:.3} 0 {large_arc} 1 {x2:.3} {y2:.3} Z"
    )
}

async fn fetch_chart_data(url: &str) -> Result<Vec<ChartDatum>, RequestError> {
    let raw = http::send_builder(http::ajax_get(url)).await?;
    http::decode(&raw)
}

#[derive(Properties, PartialEq)]
pub struct CategoryPieChartProps {
    pub endpoint: AttrValue,
    pub currency: CurrencyCode,
}

#[function_component(CategoryPieChart)]
pub fn category_pie_chart(props: &CategoryPieChartProps) -> Html {
    let data = use_state(|| None::<Vec<ChartDatum>>);

    {
        let data = data.clone();
        use_effect_with_deps(
            move |endpoint: &AttrValue| {
                let endpoint = endpoint.clone();
                spawn_local(async move {
                    match fetch_chart_data(&endpoint).await {
                        Ok(list) => {
                            log::debug!("chart data loaded: {} categories", list.len());
                            data.set(Some(list));
                        }
                        Err(err) => log::error!("Error fetching chart data: {err}"),
                    }
                });
                || ()
            },
            props.endpoint.clone(),
        );
    }

    let Some(list) = (*data).as_ref() else {
        return html! {};
    };

    let formatter = CurrencyFormatter::new(props.currency);
    let slices = build_slices(list);
    let center = VIEW_SIZE / 2.0;

    html! {
        <div class="category-pie-chart" style="display: flex; align-items: center; gap: 10px; width: 100%; height: 100%;">
            <svg viewBox={format!("0 0 {VIEW_SIZE} {VIEW_SIZE}")} style="flex: 1 1 auto; height: 100%; min-width: 0;" role="img" aria-label="Spending by category">
                { for slices.iter().filter(|s| s.is_visible()).map(|slice| {
                    let tooltip = slice.tooltip(&formatter);
                    if slice.is_full_circle() {
                        html! {
                            <circle cx={center.to_string()} cy={center.to_string()} r={RADIUS.to_string()} fill={slice.color} stroke={SLICE_BORDER} stroke-width="1">
                                <title>{ tooltip }</title>
                            </circle>
                        }
                    } else {
                        html! {
                            <path d={arc_path(center, center, RADIUS, slice.start, slice.end)} fill={slice.color} stroke={SLICE_BORDER} stroke-width="1">
                                <title>{ tooltip }</title>
                            </path>
                        }
                    }
                }) }
            </svg>
            <ul class="chart-legend" style="list-style: none; margin: 0; padding: 10px; color: #fff; font-size: 12px;">
                { for slices.iter().map(|slice| html! {
                    <li style="padding-bottom: 10px; white-space: nowrap;" title={slice.tooltip(&formatter)}>
                        <span style={format!("display: inline-block; width: 12px; height: 12px; margin-right: 6px; background: {};", slice.color)}></span>
                        { slice.label.clone() }
                    </li>
                }) }
            </ul>
        </div>
    }
}
