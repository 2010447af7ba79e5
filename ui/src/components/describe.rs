use model::layers::{BottleneckProps, RouteProps, StationProps, SuggestedProps, TractProps};
use model::{Feature, Props};

/// Popup text for a clicked primitive, one entry per line.
pub fn feature(feature: &Feature) -> Vec<String> {
    match feature.props {
        Props::Route(ref x) => route(x),
        Props::Station(ref x) => station(x),
        Props::Bottleneck(ref x) => bottleneck(x),
        Props::Tract(ref x) => tract(x),
        Props::Suggested(ref x) => suggested(x),
    }
}

pub fn route(route: &RouteProps) -> Vec<String> {
    let mut lines = vec![route.describe()];
    if let Some(ref x) = route.route_long_name {
        lines.push(x.to_string());
    }
    if let Some(ref x) = route.route_type {
        lines.push(format!("Route type: {x}"));
    }
    if let Some(ref x) = route.route_id {
        lines.push(format!("ID: {x}"));
    }
    lines
}

pub fn station(station: &StationProps) -> Vec<String> {
    let mut lines = vec![station
        .fac_name
        .clone()
        .unwrap_or_else(|| "Unnamed station".to_string())];
    if let (Some(city), Some(state)) = (&station.city, &station.state) {
        lines.push(format!("{city}, {state}"));
    }
    let modes: Vec<&str> = [
        ("bus", station.mode_bus),
        ("air", station.mode_air),
        ("rail", station.mode_rail),
        ("ferry", station.mode_ferry),
        ("bike", station.mode_bike),
    ]
    .into_iter()
    .filter(|(_, flag)| *flag == 1)
    .map(|(name, _)| name)
    .collect();
    if !modes.is_empty() {
        lines.push(format!("Modes: {}", modes.join(", ")));
    }
    if let Some(ref x) = station.website {
        lines.push(x.to_string());
    }
    lines
}

pub fn bottleneck(bottleneck: &BottleneckProps) -> Vec<String> {
    let mut lines = vec![bottleneck
        .name
        .clone()
        .unwrap_or_else(|| "Bottleneck".to_string())];
    if let Some(x) = bottleneck.rank {
        lines.push(format!("Rank: {x}"));
    }
    if let Some(ref x) = bottleneck.county {
        lines.push(format!("County: {x}"));
    }
    if let Some(x) = bottleneck.delay_hours {
        lines.push(format!("Total delay: {x} vehicle-hours"));
    }
    lines
}

pub fn tract(tract: &TractProps) -> Vec<String> {
    let mut lines = vec![tract
        .tract
        .clone()
        .unwrap_or_else(|| "Census tract".to_string())];
    if let Some(ref x) = tract.county {
        lines.push(format!("County: {x}"));
    }
    if let Some(x) = tract.poverty_pct {
        lines.push(format!("Poverty: {x}%"));
    }
    if let Some(x) = tract.ci_score {
        lines.push(format!("CalEnviroScreen score: {x}"));
    }
    if let Some(ref x) = tract.income_group {
        lines.push(format!("Income group: {x}"));
    }
    lines
}

pub fn suggested(suggested: &SuggestedProps) -> Vec<String> {
    vec![suggested.name.clone(), suggested.summary.clone()]
}
