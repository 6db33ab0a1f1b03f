//! Chart generation and rendering for the owner dashboard.
//!
//! The aggregation chart compares each employee's inbound and outbound totals
//! as grouped bars. It is generated as JSON configuration for the ECharts
//! library and rendered with its HTML container and initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, ItemStyle, JsFunction, Tooltip, Trigger,
    },
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, transaction::EmployeeTotals};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// The script tag that loads ECharts, must be in the page head before any chart renders.
pub(super) fn echarts_script() -> HeadElement {
    HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned())
}

/// Renders the container for `chart` followed by the script that draws it.
///
/// The script runs as soon as it is parsed so that the chart is also drawn
/// when the markup is swapped in by HTMX.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{}");
            const chart = echarts.getInstanceByDom(chartDom) || echarts.init(chartDom);
            chart.setOption({}, true);

            window.addEventListener('resize', chart.resize);

            const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
            const updateTheme = () => {{
                chart.setTheme(darkModeMediaQuery.matches ? 'dark' : 'default');
            }}
            darkModeMediaQuery.addEventListener('change', updateTheme);
            updateTheme();
        }})();"#,
        chart.id, chart.options
    );

    html! {
        div id=(chart.id) class="min-h-[380px] rounded dark:bg-gray-100" {}
        script { (PreEscaped(script)) }
    }
}

/// Grouped bars of inbound and outbound totals per employee.
pub(super) fn employee_totals_chart(totals: &[EmployeeTotals], currency_symbol: &str) -> Chart {
    let names = totals
        .iter()
        .map(|total| total.name.clone())
        .collect::<Vec<_>>();
    let inbound = totals.iter().map(|total| total.inbound).collect::<Vec<_>>();
    let outbound = totals.iter().map(|total| total.outbound).collect::<Vec<_>>();

    Chart::new()
        .title(
            Title::new()
                .text("Aggregation By Employee")
                .subtext("Total inbound vs outbound per employee"),
        )
        .tooltip(currency_tooltip(currency_symbol))
        .legend(Legend::new().right("4%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .top(80)
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(names))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter(currency_symbol))),
        )
        .series(
            Bar::new()
                .name("Inbound")
                .item_style(ItemStyle::new().color("#16a34a"))
                .data(inbound),
        )
        .series(
            Bar::new()
                .name("Outbound")
                .item_style(ItemStyle::new().color("#dc2626"))
                .data(outbound),
        )
}

fn currency_formatter(currency_symbol: &str) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const numberFormatter = new Intl.NumberFormat('en-US', {{
                  minimumFractionDigits: 2,
                  maximumFractionDigits: 2
                }});
                return (number) ? '{currency_symbol}' + numberFormatter.format(number) : \"-\";"
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency_symbol: &str) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency_symbol))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::transaction::EmployeeTotals;

    use super::{DashboardChart, chart_view, employee_totals_chart};

    fn totals() -> Vec<EmployeeTotals> {
        vec![
            EmployeeTotals {
                name: "John Doe".to_owned(),
                inbound: 5000.0,
                outbound: 1200.0,
            },
            EmployeeTotals {
                name: "Jane Smith".to_owned(),
                inbound: 8500.0,
                outbound: 3200.0,
            },
        ]
    }

    #[test]
    fn chart_has_employee_categories_and_two_series() {
        let options = employee_totals_chart(&totals(), "₱").to_string();

        assert!(options.contains("\"John Doe\""), "missing category in {options}");
        assert!(options.contains("\"Jane Smith\""), "missing category in {options}");
        assert!(options.contains("\"Inbound\""), "missing series in {options}");
        assert!(options.contains("\"Outbound\""), "missing series in {options}");
        assert!(options.contains("'₱'"), "missing currency symbol in {options}");
    }

    #[test]
    fn chart_view_renders_container_and_script() {
        let chart = DashboardChart {
            id: "employee-totals-chart",
            options: "{}".to_owned(),
        };

        let html = Html::parse_fragment(&chart_view(&chart).into_string());

        assert!(
            html.select(&Selector::parse("#employee-totals-chart").unwrap())
                .next()
                .is_some()
        );
        let script = html
            .select(&Selector::parse("script").unwrap())
            .next()
            .expect("want chart script")
            .inner_html();
        assert!(script.contains("getElementById(\"employee-totals-chart\")"));
    }
}
