use leptos::*;
use serde_json::Value;
use strum::IntoEnumIterator;

use crate::application::chart_context::format_amount;
use crate::application::dashboard::{
    BENCH_CHART_CONTAINER, DashboardTab, INSTRUMENT_BENCH_CHART_CONTAINER, PRICE_CHART_CONTAINER,
    load_benchmark_series, load_benchmarks, load_quality_issues, load_runs, load_summary,
    on_benchmark_index_change, on_instrument_benchmark_index_change,
    on_instrument_benchmark_series_change, on_instrument_benchmark_toggle,
    reload_selected_instrument, search_instrument_options, select_instrument, with_dashboard,
    with_dashboard_mut,
};
use crate::domain::logging::{LogComponent, get_logger};
use crate::global_state::{booting, ui_epoch};
use crate::infrastructure::api::DashboardApiClient;

fn api() -> DashboardApiClient {
    DashboardApiClient::new()
}

// ----- display helpers -----------------------------------------------------

fn fmt_cell(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Number(n) => n.as_f64().map(|n| format_amount(n, 0)).unwrap_or_default(),
        Value::String(s) if s.is_empty() => "-".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn field(row: &Value, key: &str) -> String {
    fmt_cell(row.get(key).unwrap_or(&Value::Null))
}

fn status_badge(status: &str) -> &'static str {
    match status {
        "SUCCESS" => "badge badge-success",
        "PARTIAL" => "badge badge-partial",
        "FAILED" => "badge badge-failed",
        "RUNNING" => "badge badge-running",
        _ => "badge",
    }
}

fn severity_badge(severity: &str) -> &'static str {
    match severity {
        "ERROR" => "badge badge-error",
        "WARN" => "badge badge-warn",
        "INFO" => "badge badge-info",
        _ => "badge",
    }
}

fn elapsed_seconds(start: &str, end: &str) -> String {
    if start.is_empty() || start == "-" || end.is_empty() || end == "-" {
        return "-".to_string();
    }
    let start = js_sys::Date::new(&start.into()).get_time();
    let end = js_sys::Date::new(&end.into()).get_time();
    if !start.is_finite() || !end.is_finite() {
        return "-".to_string();
    }
    format!("{:.1}", (end - start) / 1000.0)
}

fn format_date_input(year: i32, month: i32, day: i32) -> String {
    format!("{:04}-{:02}-{:02}", year, month, day)
}

/// [from, to] covering the most recent N months, ending today.
fn recent_months_range(months: i32) -> (String, String) {
    let now = js_sys::Date::new_0();
    let (year, month, day) =
        (now.get_full_year() as i32, now.get_month() as i32 + 1, now.get_date() as i32);
    let total = year * 12 + (month - 1) - months;
    let (from_year, from_month) = (total.div_euclid(12), total.rem_euclid(12) + 1);
    (format_date_input(from_year, from_month, day), format_date_input(year, month, day))
}

fn now_locale_time() -> String {
    js_sys::Date::new_0().to_locale_time_string("ko-KR").into()
}

// ----- startup -------------------------------------------------------------

/// Apply the default date range, register the window resize hook and kick
/// off the initial loads.
pub fn boot() {
    let (from, to) = recent_months_range(6);
    with_dashboard_mut(|d| {
        d.price_from = from;
        d.price_to = to;
    });

    window_event_listener(ev::resize, |_| {
        with_dashboard(|d| d.resize_charts());
    });

    spawn_local(async move {
        let client = api();
        futures::join!(load_summary(&client), load_runs(&client), load_benchmarks(&client));
        with_dashboard_mut(|d| d.last_refresh = now_locale_time());
        booting().set(false);
        get_logger().info(LogComponent::Presentation("Boot"), "initial dashboard loads done");
    });
}

fn switch_tab(tab: DashboardTab) {
    let (load_options, load_quality) = with_dashboard_mut(|d| {
        d.active_tab = tab;
        (
            tab == DashboardTab::Instruments && d.instrument_options.is_empty(),
            tab == DashboardTab::Quality && d.quality_issues.is_empty(),
        )
    })
    .unwrap_or((false, false));

    if load_options {
        spawn_local(async move { search_instrument_options(&api()).await });
    }
    if load_quality {
        spawn_local(async move { load_quality_issues(&api()).await });
    }
    with_dashboard(|d| d.resize_charts());
}

// ----- components ----------------------------------------------------------

#[component]
pub fn App() -> impl IntoView {
    view! {
        <style>{include_str!("dashboard.css")}</style>
        <div class="dashboard-app">
            <Header/>
            <TabBar/>
            <TabPanel tab=DashboardTab::Overview>
                <OverviewPanel/>
            </TabPanel>
            <TabPanel tab=DashboardTab::Instruments>
                <InstrumentsPanel/>
            </TabPanel>
            <TabPanel tab=DashboardTab::Quality>
                <QualityPanel/>
            </TabPanel>
        </div>
    }
}

#[component]
fn Header() -> impl IntoView {
    let last_refresh = move || {
        ui_epoch().get();
        with_dashboard(|d| d.last_refresh.clone()).unwrap_or_default()
    };
    view! {
        <div class="header">
            <h1>"Financial Data Collector"</h1>
            <p>
                {move || if booting().get() { "Loading...".to_string() }
                    else { format!("Last refresh: {}", last_refresh()) }}
            </p>
        </div>
    }
}

#[component]
fn TabBar() -> impl IntoView {
    let tabs = move || {
        ui_epoch().get();
        let active = with_dashboard(|d| d.active_tab).unwrap_or(DashboardTab::Overview);
        DashboardTab::iter()
            .map(|tab| {
                let class = if tab == active { "tab-btn tab-active" } else { "tab-btn" };
                view! {
                    <button class=class on:click=move |_| switch_tab(tab)>
                        {tab.label()}
                    </button>
                }
            })
            .collect_view()
    };
    view! { <div class="tab-bar">{tabs}</div> }
}

#[component]
fn TabPanel(tab: DashboardTab, children: Children) -> impl IntoView {
    let visible = move || {
        ui_epoch().get();
        with_dashboard(|d| d.active_tab == tab).unwrap_or(false)
    };
    // Panels stay mounted; hiding keeps the chart containers (and the chart
    // instances bound to them) alive across tab switches.
    view! {
        <div class="tab-panel" style:display=move || if visible() { "block" } else { "none" }>
            {children()}
        </div>
    }
}

#[component]
fn OverviewPanel() -> impl IntoView {
    let summary_cards = move || {
        ui_epoch().get();
        let summary = with_dashboard(|d| d.summary.clone()).unwrap_or(Value::Null);
        [
            ("Instruments", "instrument_count"),
            ("Price rows", "price_count"),
            ("Trading days", "trading_days"),
            ("Benchmark rows", "benchmark_count"),
            ("Open issues", "open_issues"),
        ]
        .into_iter()
        .map(|(label, key)| {
            view! {
                <div class="card">
                    <div class="card-value">{field(&summary, key)}</div>
                    <div class="card-label">{label}</div>
                </div>
            }
        })
        .collect_view()
    };

    let runs = move || {
        ui_epoch().get();
        let (loading, runs) =
            with_dashboard(|d| (d.runs_loading, d.runs.clone())).unwrap_or_default();
        if loading {
            return view! { <tr><td colspan="6">"Loading..."</td></tr> }.into_view();
        }
        runs.iter()
            .map(|run| {
                let status = field(run, "status");
                view! {
                    <tr>
                        <td>{field(run, "pipeline_name")}</td>
                        <td>{field(run, "source_name")}</td>
                        <td><span class=status_badge(&status)>{status.clone()}</span></td>
                        <td>{field(run, "started_at")}</td>
                        <td>{elapsed_seconds(&field(run, "started_at"), &field(run, "finished_at"))}</td>
                        <td>{field(run, "success_count")} " / " {field(run, "failure_count")}</td>
                    </tr>
                }
            })
            .collect_view()
    };

    view! {
        <section class="panel-section">
            <div class="card-row">{summary_cards}</div>
        </section>
        <section class="panel-section">
            <h2>"Recent collection runs"</h2>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Pipeline"</th><th>"Source"</th><th>"Status"</th>
                        <th>"Started"</th><th>"Elapsed (s)"</th><th>"OK / Fail"</th>
                    </tr>
                </thead>
                <tbody>{runs}</tbody>
            </table>
        </section>
        <BenchmarkExplorer/>
    }
}

#[component]
fn BenchmarkExplorer() -> impl IntoView {
    let index_options = move || {
        ui_epoch().get();
        let (selected, choices) = with_dashboard(|d| {
            (d.selected_index.clone(), d.benchmark_index_choices())
        })
        .unwrap_or_default();
        choices
            .into_iter()
            .map(|code| {
                let value = code.clone();
                view! { <option value=value selected={code == selected}>{code.clone()}</option> }
            })
            .collect_view()
    };

    let series_options = move || {
        ui_epoch().get();
        let (selected, options) = with_dashboard(|d| {
            (
                d.selected_series.clone(),
                d.bench_series_options.iter().map(|o| o.index_name.clone()).collect::<Vec<_>>(),
            )
        })
        .unwrap_or_default();
        options
            .into_iter()
            .map(|name| {
                let value = name.clone();
                view! { <option value=value selected={name == selected}>{name.clone()}</option> }
            })
            .collect_view()
    };

    let page_label = move || {
        ui_epoch().get();
        with_dashboard(|d| {
            if d.bench_total == 0 {
                "0 rows".to_string()
            } else {
                format!(
                    "{} - {} of {}",
                    d.bench_offset + 1,
                    (d.bench_offset + d.bench_limit).min(d.bench_total as u32),
                    d.bench_total
                )
            }
        })
        .unwrap_or_default()
    };

    let bench_error = move || {
        ui_epoch().get();
        with_dashboard(|d| d.bench_chart_error.clone()).unwrap_or_default()
    };
    let bench_loading = move || {
        ui_epoch().get();
        with_dashboard(|d| d.bench_loading).unwrap_or(false)
    };

    view! {
        <section class="panel-section">
            <h2>"Benchmark explorer"</h2>
            <div class="controls">
                <select on:change=move |ev| {
                    with_dashboard_mut(|d| d.selected_index = event_target_value(&ev));
                    spawn_local(async move { on_benchmark_index_change(&api()).await });
                }>
                    <option value="">"Select index"</option>
                    {index_options}
                </select>
                <select on:change=move |ev| {
                    with_dashboard_mut(|d| {
                        d.selected_series = event_target_value(&ev);
                        d.bench_offset = 0;
                    });
                    spawn_local(async move { load_benchmark_series(&api()).await });
                }>
                    {series_options}
                </select>
                <input type="date" prop:value=move || {
                        ui_epoch().get();
                        with_dashboard(|d| d.bench_from.clone()).unwrap_or_default()
                    }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| d.bench_from = event_target_value(&ev));
                    }/>
                <input type="date" prop:value=move || {
                        ui_epoch().get();
                        with_dashboard(|d| d.bench_to.clone()).unwrap_or_default()
                    }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| d.bench_to = event_target_value(&ev));
                    }/>
                <button on:click=move |_| {
                    with_dashboard_mut(|d| d.bench_offset = 0);
                    spawn_local(async move { load_benchmark_series(&api()).await });
                }>"Query"</button>
                <button on:click=move |_| {
                    let changed = with_dashboard_mut(|d| {
                        if d.bench_offset >= d.bench_limit {
                            d.bench_offset -= d.bench_limit;
                            true
                        } else if d.bench_offset > 0 {
                            d.bench_offset = 0;
                            true
                        } else {
                            false
                        }
                    })
                    .unwrap_or(false);
                    if changed {
                        spawn_local(async move { load_benchmark_series(&api()).await });
                    }
                }>"Prev"</button>
                <button on:click=move |_| {
                    let changed = with_dashboard_mut(|d| {
                        let next = d.bench_offset + d.bench_limit;
                        if (next as u64) < d.bench_total {
                            d.bench_offset = next;
                            true
                        } else {
                            false
                        }
                    })
                    .unwrap_or(false);
                    if changed {
                        spawn_local(async move { load_benchmark_series(&api()).await });
                    }
                }>"Next"</button>
                <span class="muted">{page_label}</span>
                <span class="muted">{move || if bench_loading() { "Loading..." } else { "" }}</span>
            </div>
            <p class="inline-error">{bench_error}</p>
            <div class="chart-box" id=BENCH_CHART_CONTAINER></div>
        </section>
    }
}

#[component]
fn InstrumentsPanel() -> impl IntoView {
    let query_input = create_rw_signal(String::new());

    let options = move || {
        ui_epoch().get();
        let (selected, options) = with_dashboard(|d| {
            (
                d.selected_instrument.as_ref().map(|o| o.external_code.clone()),
                d.instrument_options.clone(),
            )
        })
        .unwrap_or_default();
        options
            .into_iter()
            .map(|option| {
                let code = option.external_code.clone();
                let label = match &option.instrument_name {
                    Some(name) => format!("{} ({})", name, option.external_code),
                    None => option.external_code.clone(),
                };
                view! {
                    <option value=code.clone() selected={Some(&code) == selected.as_ref()}>
                        {label}
                    </option>
                }
            })
            .collect_view()
    };

    let profile_line = move || {
        ui_epoch().get();
        with_dashboard(|d| {
            let market = d.market_code();
            let name = d
                .instrument_profile
                .get("instrument_name")
                .and_then(Value::as_str)
                .map(str::to_string)
                .or_else(|| {
                    d.selected_instrument.as_ref().and_then(|o| o.instrument_name.clone())
                })
                .unwrap_or_else(|| "-".to_string());
            if market.is_empty() { name } else { format!("{} | {}", name, market) }
        })
        .unwrap_or_default()
    };

    let price_state = move || {
        ui_epoch().get();
        with_dashboard(|d| {
            if d.price_loading {
                "Loading price history...".to_string()
            } else if d.price_queried && d.prices.is_empty() {
                "No data for the selected range.".to_string()
            } else {
                String::new()
            }
        })
        .unwrap_or_default()
    };

    view! {
        <section class="panel-section">
            <div class="controls">
                <input
                    type="text"
                    placeholder="Search code or name"
                    prop:value=move || query_input.get()
                    on:input=move |ev| query_input.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" {
                            with_dashboard_mut(|d| d.instrument_query = query_input.get_untracked());
                            spawn_local(async move { search_instrument_options(&api()).await });
                        }
                    }/>
                <button on:click=move |_| {
                    with_dashboard_mut(|d| d.instrument_query = query_input.get_untracked());
                    spawn_local(async move { search_instrument_options(&api()).await });
                }>"Search"</button>
                <select on:change=move |ev| {
                    let code = event_target_value(&ev);
                    let option = with_dashboard(|d| {
                        d.instrument_options.iter().find(|o| o.external_code == code).cloned()
                    })
                    .flatten();
                    if let Some(option) = option {
                        spawn_local(async move { select_instrument(&api(), option).await });
                    }
                }>
                    {options}
                </select>
                <span class="muted">{profile_line}</span>
            </div>
            <div class="controls">
                <input type="date" prop:value=move || {
                        ui_epoch().get();
                        with_dashboard(|d| d.price_from.clone()).unwrap_or_default()
                    }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| d.price_from = event_target_value(&ev));
                    }/>
                <input type="date" prop:value=move || {
                        ui_epoch().get();
                        with_dashboard(|d| d.price_to.clone()).unwrap_or_default()
                    }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| d.price_to = event_target_value(&ev));
                    }/>
                <button on:click=move |_| {
                    let (from, to) = recent_months_range(6);
                    with_dashboard_mut(|d| {
                        d.price_from = from;
                        d.price_to = to;
                    });
                    spawn_local(async move { reload_selected_instrument(&api()).await });
                }>"Recent 6M"</button>
                <button on:click=move |_| {
                    spawn_local(async move { reload_selected_instrument(&api()).await });
                }>"Reload"</button>
                <span class="muted">{price_state}</span>
            </div>
            <p class="inline-error">{move || {
                ui_epoch().get();
                with_dashboard(|d| d.price_chart_error.clone()).unwrap_or_default()
            }}</p>
            <div class="chart-box" id=PRICE_CHART_CONTAINER></div>
        </section>
        <BenchOverlaySection/>
        <MaSettingsEditor/>
        <PricesTable/>
    }
}

#[component]
fn BenchOverlaySection() -> impl IntoView {
    let show = move || {
        ui_epoch().get();
        with_dashboard(|d| d.show_instrument_bench).unwrap_or(false)
    };

    let index_options = move || {
        ui_epoch().get();
        let (selected, choices) = with_dashboard(|d| {
            (d.instrument_bench_index_code.clone(), d.benchmark_index_choices())
        })
        .unwrap_or_default();
        choices
            .into_iter()
            .map(|code| {
                let value = code.clone();
                view! { <option value=value selected={code == selected}>{code.clone()}</option> }
            })
            .collect_view()
    };

    let series_options = move || {
        ui_epoch().get();
        let (selected, options) = with_dashboard(|d| {
            (
                d.instrument_bench_series_name.clone(),
                d.instrument_bench_series_options
                    .iter()
                    .map(|o| o.index_name.clone())
                    .collect::<Vec<_>>(),
            )
        })
        .unwrap_or_default();
        options
            .into_iter()
            .map(|name| {
                let value = name.clone();
                view! { <option value=value selected={name == selected}>{name.clone()}</option> }
            })
            .collect_view()
    };

    let state_line = move || {
        ui_epoch().get();
        with_dashboard(|d| {
            if d.instrument_bench_loading {
                "Loading benchmark...".to_string()
            } else if !d.instrument_bench_error.is_empty() {
                d.instrument_bench_error.clone()
            } else if d.instrument_bench_queried && d.instrument_bench_series.is_empty() {
                "No benchmark data for the selected range.".to_string()
            } else {
                String::new()
            }
        })
        .unwrap_or_default()
    };

    view! {
        <section class="panel-section">
            <div class="controls">
                <label>
                    <input
                        type="checkbox"
                        prop:checked=show
                        on:change=move |ev| {
                            with_dashboard_mut(|d| {
                                d.show_instrument_bench = event_target_checked(&ev);
                            });
                            spawn_local(async move {
                                on_instrument_benchmark_toggle(&api()).await
                            });
                        }/>
                    " Overlay market benchmark"
                </label>
                <select
                    style:display=move || if show() { "inline-block" } else { "none" }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| {
                            d.instrument_bench_index_code = event_target_value(&ev);
                        });
                        spawn_local(async move {
                            on_instrument_benchmark_index_change(&api()).await
                        });
                    }>
                    {index_options}
                </select>
                <select
                    style:display=move || if show() { "inline-block" } else { "none" }
                    on:change=move |ev| {
                        with_dashboard_mut(|d| {
                            d.instrument_bench_series_name = event_target_value(&ev);
                        });
                        spawn_local(async move {
                            on_instrument_benchmark_series_change(&api()).await
                        });
                    }>
                    {series_options}
                </select>
                <span class="muted">{state_line}</span>
            </div>
            <div
                class="chart-box"
                id=INSTRUMENT_BENCH_CHART_CONTAINER
                style:display=move || if show() { "block" } else { "none" }>
            </div>
        </section>
    }
}

#[component]
fn MaSettingsEditor() -> impl IntoView {
    let price_input = create_rw_signal(String::new());
    let volume_input = create_rw_signal(String::new());

    let chips = move |volume: bool| {
        ui_epoch().get();
        let periods = with_dashboard(|d| {
            if volume { d.volume_ma.periods().to_vec() } else { d.price_ma.periods().to_vec() }
        })
        .unwrap_or_default();
        periods
            .into_iter()
            .map(|period| {
                view! {
                    <span class="chip">
                        {format!("SMA {}", period)}
                        <button class="chip-remove" on:click=move |_| {
                            with_dashboard_mut(|d| {
                                if volume {
                                    d.remove_volume_ma(period);
                                } else {
                                    d.remove_price_ma(period);
                                }
                            });
                        }>"×"</button>
                    </span>
                }
            })
            .collect_view()
    };

    view! {
        <section class="panel-section">
            <h2>"Moving averages"</h2>
            <div class="controls">
                <span>"Price:"</span>
                {move || chips(false)}
                <input type="number" prop:value=move || price_input.get()
                    on:input=move |ev| price_input.set(event_target_value(&ev))/>
                <button on:click=move |_| {
                    let added = with_dashboard_mut(|d| d.add_price_ma(&price_input.get_untracked()))
                        .unwrap_or(false);
                    if added {
                        price_input.set(String::new());
                    }
                }>"Add"</button>
            </div>
            <div class="controls">
                <span>"Volume:"</span>
                {move || chips(true)}
                <input type="number" prop:value=move || volume_input.get()
                    on:input=move |ev| volume_input.set(event_target_value(&ev))/>
                <button on:click=move |_| {
                    let added =
                        with_dashboard_mut(|d| d.add_volume_ma(&volume_input.get_untracked()))
                            .unwrap_or(false);
                    if added {
                        volume_input.set(String::new());
                    }
                }>"Add"</button>
            </div>
            <p class="inline-error">{move || {
                ui_epoch().get();
                with_dashboard(|d| d.ma_settings_error.clone()).unwrap_or_default()
            }}</p>
        </section>
    }
}

#[component]
fn PricesTable() -> impl IntoView {
    let rows = move || {
        ui_epoch().get();
        let prices = with_dashboard(|d| d.prices.clone()).unwrap_or_default();
        prices
            .iter()
            .rev()
            .take(30)
            .map(|row| {
                view! {
                    <tr>
                        <td>{row.trade_date.clone()}</td>
                        <td>{fmt_cell(&row.open)}</td>
                        <td>{fmt_cell(&row.high)}</td>
                        <td>{fmt_cell(&row.low)}</td>
                        <td>{fmt_cell(&row.close)}</td>
                        <td>{fmt_cell(&row.volume)}</td>
                    </tr>
                }
            })
            .collect_view()
    };

    view! {
        <section class="panel-section">
            <h2>"Recent sessions"</h2>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Date"</th><th>"Open"</th><th>"High"</th>
                        <th>"Low"</th><th>"Close"</th><th>"Volume"</th>
                    </tr>
                </thead>
                <tbody>{rows}</tbody>
            </table>
        </section>
    }
}

#[component]
fn QualityPanel() -> impl IntoView {
    let issues = move || {
        ui_epoch().get();
        let (loading, issues) =
            with_dashboard(|d| (d.quality_loading, d.quality_issues.clone())).unwrap_or_default();
        if loading {
            return view! { <tr><td colspan="6">"Loading..."</td></tr> }.into_view();
        }
        issues
            .iter()
            .map(|issue| {
                let severity = field(issue, "severity");
                view! {
                    <tr>
                        <td><span class=severity_badge(&severity)>{severity.clone()}</span></td>
                        <td>{field(issue, "dataset_name")}</td>
                        <td>{field(issue, "trade_date")}</td>
                        <td>{field(issue, "external_code")}</td>
                        <td>{field(issue, "issue_code")}</td>
                        <td>{field(issue, "issue_detail")}</td>
                    </tr>
                }
            })
            .collect_view()
    };

    view! {
        <section class="panel-section">
            <div class="controls">
                <select on:change=move |ev| {
                    with_dashboard_mut(|d| d.quality_severity = event_target_value(&ev));
                    spawn_local(async move { load_quality_issues(&api()).await });
                }>
                    <option value="">"All severities"</option>
                    <option value="ERROR">"ERROR"</option>
                    <option value="WARN">"WARN"</option>
                    <option value="INFO">"INFO"</option>
                </select>
            </div>
            <table class="data-table">
                <thead>
                    <tr>
                        <th>"Severity"</th><th>"Dataset"</th><th>"Date"</th>
                        <th>"Code"</th><th>"Issue"</th><th>"Detail"</th>
                    </tr>
                </thead>
                <tbody>{issues}</tbody>
            </table>
        </section>
    }
}
