use model::{Feature, Props, StationProps};

use crate::canvas::PathStyle;

const ROUTE_TYPE_COUNT: usize = 6;
const FALLBACK: &str = "#666666";

/// Route lines are keyed by GTFS route type; tract fills scale with the
/// CalEnviroScreen score, matching the severity ramp the rest of the state
/// tooling uses.
pub fn path_style(feature: &Feature) -> PathStyle {
    match feature.props {
        Props::Route(ref route) => PathStyle::line(route_type_color(route.route_type.as_deref()), 3.0),
        Props::Bottleneck(_) => PathStyle::line(hex(colorous::REDS.eval_continuous(0.75)), 5.0),
        Props::Tract(ref tract) => {
            let score = tract.ci_score.unwrap_or(0.0).clamp(0.0, 100.0) / 100.0;
            PathStyle::fill(hex(colorous::ORANGES.eval_continuous(score)), 0.35)
        }
        Props::Suggested(_) => {
            let mut style = PathStyle::line(hex(colorous::PURPLES.eval_continuous(0.7)), 4.0);
            style.dashed = true;
            style
        }
        Props::Station(_) => PathStyle::line(FALLBACK.to_string(), 1.0),
    }
}

pub fn route_type_color(code: Option<&str>) -> String {
    match code.and_then(|x| x.parse::<usize>().ok()) {
        Some(code) if code < ROUTE_TYPE_COUNT => {
            hex(colorous::SINEBOW.eval_rational(code, ROUTE_TYPE_COUNT))
        }
        _ => FALLBACK.to_string(),
    }
}

pub fn marker_color(_: &StationProps) -> &'static str {
    "#2171b5"
}

fn hex(color: colorous::Color) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
}

#[cfg(test)]
mod tests {
    use super::route_type_color;

    #[test]
    fn unknown_route_types_fall_back_to_grey() {
        assert_eq!(route_type_color(None), "#666666");
        assert_eq!(route_type_color(Some("9")), "#666666");
        assert_ne!(route_type_color(Some("0")), route_type_color(Some("3")));
    }
}
