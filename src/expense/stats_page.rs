//! The stats page: a pie chart and table of spending per category over the last six months.

use std::collections::BTreeMap;

use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::{Legend, Title},
    element::{JsFunction, Tooltip, Trigger},
    series::Pie,
};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    endpoints,
    expense::summary_endpoint::{CategorySummaryState, summarise_categories},
    html::{
        CATEGORY_BADGE_STYLE, HeadElement, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_currency,
    },
    navigation::NavBar,
};

const CHART_ID: &str = "category-chart";

fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

fn category_chart(totals: &BTreeMap<String, f64>) -> Chart {
    let data = totals
        .iter()
        .map(|(category, total)| (*total, category.clone()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Spending by category")
                .subtext("Last six months"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Spending").radius("60%").data(data))
}

fn chart_script(options: &str) -> HeadElement {
    let script = format!(
        r#"document.addEventListener('DOMContentLoaded', function() {{
    const chartDom = document.getElementById("{CHART_ID}");
    const chart = echarts.init(chartDom);
    chart.setOption({options});

    window.addEventListener('resize', chart.resize);

    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
    const updateTheme = () => {{
        chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
    }};
    darkModeMediaQuery.addEventListener('change', updateTheme);
    updateTheme();
}});"#
    );

    HeadElement::ScriptSource(PreEscaped(script))
}

fn stats_view(start: Date, totals: &BTreeMap<String, f64>) -> Markup {
    let nav_bar = NavBar::new(endpoints::STATS_VIEW).into_html();
    let grand_total: f64 = totals.values().sum();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-3xl space-y-4"
            {
                h1 class="text-xl font-bold" { "Stats" }

                p class="text-sm" { "Spending since " (start) "." }

                @if totals.is_empty() {
                    p data-empty-state="true" { "No expenses in the last six months." }
                } @else {
                    div
                        id=(CHART_ID)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}

                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Total" }
                            }
                        }

                        tbody
                        {
                            @for (category, total) in totals {
                                tr class=(TABLE_ROW_STYLE) data-category-row="true"
                                {
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        span class=(CATEGORY_BADGE_STYLE) { (category) }
                                    }
                                    td class={ (TABLE_CELL_STYLE) " text-right" } { (format_currency(*total)) }
                                }
                            }

                            tr class=(TABLE_ROW_STYLE)
                            {
                                th scope="row" class=(TABLE_CELL_STYLE) { "Total" }
                                td id="grand-total" class={ (TABLE_CELL_STYLE) " text-right font-semibold" }
                                {
                                    (format_currency(grand_total))
                                }
                            }
                        }
                    }
                }
            }
        }
    };

    let head_elements = if totals.is_empty() {
        Vec::new()
    } else {
        vec![
            HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
            chart_script(&category_chart(totals).to_string()),
        ]
    };

    base("Stats", &head_elements, &content)
}

/// Render the user's spending per category over the last six months.
pub async fn get_stats_page(
    State(state): State<CategorySummaryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let (start, totals) = summarise_categories(&state, user_id)?;

    Ok(stats_view(start, &totals).into_response())
}
