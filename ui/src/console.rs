use std::str::FromStr;

use anyhow::Result;

use model::{FilterState, LayerName, LayerSource, Mode, ROUTE_TYPE_CODES};

use crate::ai::{AiClient, SuggestionOutcome};
use crate::canvas::TraceCanvas;
use crate::chat::{ChatLog, Sender};
use crate::viewer::{LayerState, Viewer};

/// Line-oriented control surface over the map pipeline: toggles, filters,
/// click inspection, the assistant panel and export all run through here.
pub struct Console {
    viewer: Viewer,
    canvas: TraceCanvas,
    chat: ChatLog,
    ai: AiClient,
    source: Box<dyn LayerSource>,
}

const HELP: &str = "\
show/hide/toggle <layer>   layers: routes, stations, bottlenecks, low_income, ai_suggested
types <codes|all|none>     enabled route types, e.g. types 1,3
search [text]              name filter; no argument clears it
mode [bus|air|rail|ferry|bike]
state [XX]                 two-letter station state filter
reset                      clear all filters
click <layer> <n>          open the n-th drawn primitive's popup
status                     layer states and drawn primitive counts
ask <question>             ask the assistant about the visible map
chat                       show the assistant transcript
suggest                    ask for new transit corridors
match <photo path>         find the closest stop photo
export <path>              write the visible features as GeoJSON
quit";

impl Console {
    pub fn new(source: Box<dyn LayerSource>, ai: AiClient) -> Self {
        Self {
            viewer: Viewer::new(),
            canvas: TraceCanvas::new(),
            chat: ChatLog::new(),
            ai,
            source,
        }
    }

    /// Handles one command; returns false when the session should end.
    pub fn run_line(&mut self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return true;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((x, rest)) => (x, rest.trim()),
            None => (line, ""),
        };
        match command {
            "quit" | "exit" => return false,
            "help" => println!("{HELP}"),
            "show" => self.set_visible(rest, true),
            "hide" => self.set_visible(rest, false),
            "toggle" => match rest.parse::<LayerName>() {
                Ok(layer) => {
                    let on = self.viewer.layer_state(layer) != LayerState::Hidden;
                    self.set_visible(rest, !on);
                }
                Err(err) => println!("{err}"),
            },
            "types" => self.set_types(rest),
            "search" => {
                let mut filters = self.viewer.filters().clone();
                filters.name_search = rest.to_string();
                self.viewer.on_filter_change(&mut self.canvas, filters);
            }
            "mode" => {
                let mut filters = self.viewer.filters().clone();
                if rest.is_empty() || rest == "all" {
                    filters.mode = None;
                } else {
                    match Mode::from_str(rest) {
                        Ok(mode) => filters.mode = Some(mode),
                        Err(err) => {
                            println!("{err}");
                            return true;
                        }
                    }
                }
                self.viewer.on_filter_change(&mut self.canvas, filters);
            }
            "state" => {
                let mut filters = self.viewer.filters().clone();
                filters.state = if rest.is_empty() || rest == "all" {
                    None
                } else {
                    Some(rest.to_string())
                };
                self.viewer.on_filter_change(&mut self.canvas, filters);
            }
            "reset" => {
                self.viewer
                    .on_filter_change(&mut self.canvas, FilterState::new());
            }
            "click" => self.click(rest),
            "status" => self.status(),
            "ask" => self.ask(rest),
            "chat" => {
                for message in self.chat.messages() {
                    let who = match message.sender {
                        Sender::User => "you",
                        Sender::Assistant => "assistant",
                    };
                    println!("[{}] {who}: {}", message.timestamp.format("%H:%M:%S"), message.text);
                }
            }
            "suggest" => self.suggest(),
            "match" => match self.ai.match_photo(rest) {
                Ok(matched) => {
                    println!(
                        "Similarity: {:.1}%",
                        matched.similarity_score * 100.0
                    );
                    println!("Reference image: {}", matched.matched_image);
                }
                Err(err) => println!("Photo match unavailable: {err}"),
            },
            "export" => {
                if let Err(err) = self.export(rest) {
                    println!("Export failed: {err}");
                }
            }
            _ => println!("Unknown command; try help"),
        }
        true
    }

    fn set_visible(&mut self, layer: &str, visible: bool) {
        let layer = match layer.parse::<LayerName>() {
            Ok(x) => x,
            Err(err) => {
                println!("{err}");
                return;
            }
        };
        if let Some(request) = self.viewer.set_visible(&mut self.canvas, layer, visible) {
            // The fetch happens here, outside the state machine; the result
            // is delivered like any other completion event
            let result = self.source.fetch(request.layer);
            self.viewer
                .on_fetch_complete(&mut self.canvas, request.layer, result);
        }
        println!(
            "{layer}: {}",
            match self.viewer.layer_state(layer) {
                LayerState::Hidden => "hidden".to_string(),
                LayerState::Loading => "loading".to_string(),
                LayerState::Visible =>
                    format!("visible, {} drawn", self.viewer.drawn_count(layer)),
            }
        );
    }

    fn set_types(&mut self, rest: &str) {
        let mut filters = self.viewer.filters().clone();
        filters.route_types.clear();
        match rest {
            "all" => {
                filters.route_types = ROUTE_TYPE_CODES.iter().map(|x| x.to_string()).collect();
            }
            "none" | "" => {}
            _ => {
                for code in rest.split(',').map(|x| x.trim()) {
                    if ROUTE_TYPE_CODES.contains(&code) {
                        filters.route_types.insert(code.to_string());
                    } else {
                        warn!("ignoring unknown route type {code}");
                    }
                }
            }
        }
        self.viewer.on_filter_change(&mut self.canvas, filters);
        println!("Enabled route types: {}", filters_list(self.viewer.filters()));
    }

    fn click(&mut self, rest: &str) {
        let (layer, idx) = match parse_click(rest) {
            Ok(x) => x,
            Err(err) => {
                println!("{err}");
                return;
            }
        };
        let anchor = self
            .viewer
            .primitive_id(layer, idx)
            .and_then(|id| self.canvas.get(id))
            .and_then(|primitive| primitive.points.first().copied());
        let anchor = match anchor {
            Some(x) => x,
            None => {
                println!("No drawn primitive {idx} on {layer}");
                return;
            }
        };
        if self.viewer.on_click(&mut self.canvas, layer, idx, anchor) {
            if let Some(popup) = self.canvas.popups().last() {
                for line in &popup.lines {
                    println!("{line}");
                }
            }
        }
    }

    fn status(&self) {
        for layer in LayerName::ALL {
            let state = match self.viewer.layer_state(layer) {
                LayerState::Hidden => "hidden",
                LayerState::Loading => "loading",
                LayerState::Visible => "visible",
            };
            println!(
                "{layer}: {state}, {} drawn",
                self.viewer.drawn_count(layer)
            );
        }
        println!("Enabled route types: {}", filters_list(self.viewer.filters()));
    }

    fn ask(&mut self, question: &str) {
        if question.is_empty() {
            println!("ask what?");
            return;
        }
        self.chat.push(Sender::User, question.to_string());
        let text = match self.ai.chat(question, &self.viewer.map_context()) {
            Ok(answer) => answer,
            // Inline, recoverable: the transcript records the failure and
            // the user can just resubmit
            Err(err) => format!("Sorry, I couldn't answer that: {err}"),
        };
        println!("{text}");
        self.chat.push(Sender::Assistant, text);
    }

    fn suggest(&mut self) {
        match self.ai.suggest_routes(&self.viewer.map_context()) {
            Ok(SuggestionOutcome::Parsed(routes)) => {
                for route in &routes {
                    println!("{}: {}", route.name, route.summary);
                }
                self.viewer.apply_suggestions(&mut self.canvas, &routes);
                println!("Drew {} suggested corridors", routes.len());
            }
            Ok(SuggestionOutcome::Raw(text)) => println!("{text}"),
            Err(err) => println!("Route suggestions unavailable: {err}"),
        }
    }

    fn export(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            bail!("export where?");
        }
        let features = self.viewer.visible_features();
        let collection = model::export::to_geojson(&features);
        fs_err::write(path, serde_json::to_string_pretty(&collection)?)?;
        println!("Wrote {} features to {path}", features.len());
        Ok(())
    }
}

fn parse_click(rest: &str) -> Result<(LayerName, usize)> {
    let (layer, idx) = match rest.split_once(' ') {
        Some(x) => x,
        None => bail!("usage: click <layer> <n>"),
    };
    Ok((layer.parse()?, idx.trim().parse()?))
}

fn filters_list(filters: &FilterState) -> String {
    if filters.route_types.is_empty() {
        "none".to_string()
    } else {
        filters.active_route_types()
    }
}
