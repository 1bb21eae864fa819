use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use mail_triage::data::aggregate::{count_by, count_by_pair, daily_volume, GroupField};
use mail_triage::data::model::Priority;
use mail_triage::state::AppState;

use crate::color::{self, StatusColors};

const CHART_HEIGHT: f32 = 240.0;

/// Bar charts over named categories at x = 0, 1, 2, ...
fn show_categories(ui: &mut Ui, id: &str, labels: Vec<String>, charts: Vec<BarChart>) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show_grid([false, true])
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round();
            if (mark.value - i).abs() > f64::EPSILON || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Overview: priority distribution and status by department
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    ui.columns(2, |cols| {
        cols[0].strong("Priority Distribution");
        priority_chart(&mut cols[0], state);
        cols[1].strong("Status by Department");
        status_by_department(&mut cols[1], state);
    });
}

/// One bar per priority, in rank order.
pub fn priority_chart(ui: &mut Ui, state: &AppState) {
    let counts = count_by(&state.view(), GroupField::Priority);
    let mut priorities: Vec<Priority> = counts.keys().map(|k| Priority::parse(k)).collect();
    priorities.sort_by(|a, b| b.rank().cmp(&a.rank()).then_with(|| a.cmp(b)));

    let labels: Vec<String> = priorities.iter().map(|p| p.to_string()).collect();
    let charts: Vec<BarChart> = priorities
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let n = counts.get(p.as_str()).copied().unwrap_or(0);
            let c = color::priority_color(p);
            BarChart::new(vec![Bar::new(i as f64, n as f64).name(p.as_str()).fill(c)])
                .name(p.as_str())
                .color(c)
                .width(0.6)
        })
        .collect();

    show_categories(ui, "priority_chart", labels, charts);
}

/// Departments on the x axis, one stacked layer per status.
pub fn status_by_department(ui: &mut Ui, state: &AppState) {
    let counts = count_by_pair(&state.view(), GroupField::Department, GroupField::Status);
    let departments: Vec<String> = counts
        .keys()
        .map(|(d, _)| d.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let statuses: BTreeSet<&str> = counts.keys().map(|(_, s)| s.as_str()).collect();
    let status_colors = StatusColors::new(&state.table.options().statuses);

    let mut charts: Vec<BarChart> = Vec::new();
    for status in statuses {
        let c = status_colors.color_for_label(status);
        let bars: Vec<Bar> = departments
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let n = counts
                    .get(&(d.clone(), status.to_string()))
                    .copied()
                    .unwrap_or(0);
                Bar::new(i as f64, n as f64).name(format!("{d} – {status}")).fill(c)
            })
            .collect();
        let chart = {
            let below: Vec<&BarChart> = charts.iter().collect();
            BarChart::new(bars)
                .name(status)
                .color(c)
                .width(0.6)
                .stack_on(&below)
        };
        charts.push(chart);
    }

    show_categories(ui, "status_by_department", departments, charts);
}

// ---------------------------------------------------------------------------
// Daily volume
// ---------------------------------------------------------------------------

/// Emails received per day over the current view.
pub fn daily_volume_chart(ui: &mut Ui, state: &AppState) {
    ui.strong("Daily Email Volume");
    let volume = daily_volume(&state.view());
    if volume.is_empty() {
        ui.label("No dated emails in the current view.");
        return;
    }

    let points: Vec<[f64; 2]> = volume
        .iter()
        .map(|(day, n)| [day.num_days_from_ce() as f64, *n as f64])
        .collect();

    Plot::new("daily_volume")
        .height(CHART_HEIGHT)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .y_axis_label("Emails")
        .x_axis_formatter(|mark, _range| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%m-%d").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("Emails received")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(PlotPoints::from(points))
                    .radius(4.0)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}
