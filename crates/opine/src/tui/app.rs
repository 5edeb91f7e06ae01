//! Application state and the workflow state machine.
//!
//! Each screen is one variant of [`Screen`], carrying the objects selected
//! on the screens before it. Transitions happen only in key handlers, so
//! at most one screen is active and at most one call site appends to the
//! bundle at a time.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;

use opine_model::{Bundle, Identity, Indicator, Opinion, QueryIndex};

use crate::report;

/// Which workflow this process runs.
#[derive(Debug)]
pub enum Flow {
    /// Authoring: record one opinion, save, exit.
    Judge { output: PathBuf },
    /// Review: browse opinions until the user cancels.
    Read,
}

/// The active screen, with everything selected so far as typed payload.
#[derive(Debug)]
pub enum Screen {
    /// Pick an existing identity or ask for a new one.
    SelectIdentity { cursor: usize },
    /// Enter name and email for a fresh identity.
    NewIdentity(IdentityForm),
    /// Pick the indicator to evaluate (authoring carries the acting
    /// identity; review has none).
    SelectIndicator {
        identity: Option<Identity>,
        cursor: usize,
    },
    /// Capture opinion value and explanation.
    Evaluate(EvaluateState),
    /// Paginated opinion report for one indicator (review only).
    ViewOpinions(ViewState),
}

/// Outcome of the identity selection list.
#[derive(Debug)]
pub enum IdentityChoice {
    RequestNewIdentity,
    Existing(Identity),
}

#[derive(Debug, Default)]
pub struct IdentityForm {
    pub name: String,
    pub email: String,
    pub focus: FormFocus,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FormFocus {
    #[default]
    Name,
    Email,
}

#[derive(Debug)]
pub struct EvaluateState {
    pub identity: Identity,
    pub indicator: Indicator,
    pub value_cursor: usize,
    pub explanation: String,
    pub focus: EvaluateFocus,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum EvaluateFocus {
    Values,
    Explanation,
}

#[derive(Debug)]
pub struct ViewState {
    pub title: String,
    pub report: String,
    pub scroll: u16,
}

/// List row format shared by the picker screens: `"<name>\n\t<id>"`.
pub fn indicator_label(indicator: &Indicator) -> String {
    format!("{}\n\t{}", indicator.display_name(), indicator.id)
}

pub fn identity_label(identity: &Identity) -> String {
    format!(
        "{}: {}\n\t{}",
        report::title_case(&identity.identity_class),
        identity.name,
        identity.id
    )
}

pub struct App {
    /// Whether the event loop keeps running
    pub running: bool,
    /// Active workflow
    pub flow: Flow,
    /// The bundle, exclusively owned for the process lifetime
    pub bundle: Bundle,
    /// Active screen
    pub screen: Screen,
    /// Opinion value domain, threaded in from startup configuration
    pub opinion_values: Vec<String>,
}

impl App {
    pub fn new(flow: Flow, bundle: Bundle, opinion_values: Vec<String>) -> Self {
        let screen = match flow {
            Flow::Judge { .. } => Screen::SelectIdentity { cursor: 0 },
            Flow::Read => Screen::SelectIndicator {
                identity: None,
                cursor: 0,
            },
        };
        Self {
            running: true,
            flow,
            bundle,
            screen,
            opinion_values,
        }
    }

    /// Identities in bundle order, cloned for payload transfer.
    pub fn identities(&self) -> Vec<Identity> {
        QueryIndex::new(&self.bundle)
            .identities()
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn indicators(&self) -> Vec<Indicator> {
        QueryIndex::new(&self.bundle)
            .indicators()
            .into_iter()
            .cloned()
            .collect()
    }

    /// What the identity list row under `cursor` stands for. Row 0 is the
    /// `NEW IDENTITY` sentinel, everything after maps onto the bundle's
    /// identities in order.
    fn identity_choice(&self, cursor: usize) -> Option<IdentityChoice> {
        if cursor == 0 {
            return Some(IdentityChoice::RequestNewIdentity);
        }
        self.identities()
            .into_iter()
            .nth(cursor - 1)
            .map(IdentityChoice::Existing)
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Park a placeholder while the active screen is handled by value.
        let screen = std::mem::replace(&mut self.screen, Screen::SelectIdentity { cursor: 0 });
        self.screen = match screen {
            Screen::SelectIdentity { cursor } => self.on_select_identity(cursor, key),
            Screen::NewIdentity(form) => self.on_new_identity(form, key),
            Screen::SelectIndicator { identity, cursor } => {
                self.on_select_indicator(identity, cursor, key)?
            }
            Screen::Evaluate(state) => self.on_evaluate(state, key)?,
            Screen::ViewOpinions(state) => self.on_view_opinions(state, key),
        };
        Ok(())
    }

    fn on_select_identity(&mut self, mut cursor: usize, key: KeyEvent) -> Screen {
        let rows = 1 + self.identities().len();
        match key.code {
            KeyCode::Up => cursor = cursor.saturating_sub(1),
            KeyCode::Down => {
                if cursor + 1 < rows {
                    cursor += 1;
                }
            }
            KeyCode::Enter => match self.identity_choice(cursor) {
                Some(IdentityChoice::RequestNewIdentity) => {
                    return Screen::NewIdentity(IdentityForm::default());
                }
                Some(IdentityChoice::Existing(identity)) => {
                    return Screen::SelectIndicator {
                        identity: Some(identity),
                        cursor: 0,
                    };
                }
                None => {}
            },
            // Cancel at the entry screen ends the session with no output.
            KeyCode::Esc => self.running = false,
            _ => {}
        }
        Screen::SelectIdentity { cursor }
    }

    fn on_new_identity(&mut self, mut form: IdentityForm, key: KeyEvent) -> Screen {
        match key.code {
            KeyCode::Esc => return Screen::SelectIdentity { cursor: 0 },
            KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
                form.focus = match form.focus {
                    FormFocus::Name => FormFocus::Email,
                    FormFocus::Email => FormFocus::Name,
                };
            }
            KeyCode::Enter => match form.focus {
                FormFocus::Name => form.focus = FormFocus::Email,
                FormFocus::Email => {
                    let identity = Identity::individual(form.name, form.email);
                    // The creator is committed before indicator capture
                    // begins; cancelling later keeps it in the bundle.
                    self.bundle.append_identity(identity.clone());
                    return Screen::SelectIndicator {
                        identity: Some(identity),
                        cursor: 0,
                    };
                }
            },
            KeyCode::Backspace => {
                match form.focus {
                    FormFocus::Name => form.name.pop(),
                    FormFocus::Email => form.email.pop(),
                };
            }
            KeyCode::Char(c) => match form.focus {
                FormFocus::Name => form.name.push(c),
                FormFocus::Email => form.email.push(c),
            },
            _ => {}
        }
        Screen::NewIdentity(form)
    }

    fn on_select_indicator(
        &mut self,
        identity: Option<Identity>,
        mut cursor: usize,
        key: KeyEvent,
    ) -> Result<Screen> {
        let indicators = self.indicators();
        match key.code {
            KeyCode::Up => cursor = cursor.saturating_sub(1),
            KeyCode::Down => {
                if !indicators.is_empty() && cursor < indicators.len() - 1 {
                    cursor += 1;
                }
            }
            KeyCode::Enter => {
                // An empty list has nothing to select; only cancel applies.
                if let Some(indicator) = indicators.into_iter().nth(cursor) {
                    return match identity {
                        Some(identity) => Ok(Screen::Evaluate(EvaluateState {
                            identity,
                            indicator,
                            value_cursor: 0,
                            explanation: String::new(),
                            focus: EvaluateFocus::Values,
                        })),
                        None => Ok(Screen::ViewOpinions(self.build_view(&indicator)?)),
                    };
                }
            }
            KeyCode::Esc => match self.flow {
                // Authoring backs out to identity selection; review ends.
                Flow::Judge { .. } => return Ok(Screen::SelectIdentity { cursor: 0 }),
                Flow::Read => self.running = false,
            },
            _ => {}
        }
        Ok(Screen::SelectIndicator { identity, cursor })
    }

    fn on_evaluate(&mut self, mut state: EvaluateState, key: KeyEvent) -> Result<Screen> {
        // Save from either focus; an unresolvable write target is fatal.
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            let value = self.opinion_values[state.value_cursor].as_str();
            let opinion = Opinion::new(
                state.indicator.id.as_str(),
                value,
                state.explanation.as_str(),
                state.identity.id.as_str(),
            );
            self.bundle.append_opinion(opinion);
            self.save_bundle()?;
            self.running = false;
            return Ok(Screen::Evaluate(state));
        }

        match key.code {
            // Discard only the in-progress opinion; a freshly created
            // identity stays committed.
            KeyCode::Esc => return Ok(Screen::SelectIdentity { cursor: 0 }),
            KeyCode::Tab => {
                state.focus = match state.focus {
                    EvaluateFocus::Values => EvaluateFocus::Explanation,
                    EvaluateFocus::Explanation => EvaluateFocus::Values,
                };
            }
            code => match state.focus {
                EvaluateFocus::Values => match code {
                    KeyCode::Up => state.value_cursor = state.value_cursor.saturating_sub(1),
                    KeyCode::Down => {
                        if state.value_cursor + 1 < self.opinion_values.len() {
                            state.value_cursor += 1;
                        }
                    }
                    _ => {}
                },
                EvaluateFocus::Explanation => match code {
                    KeyCode::Char(c) => state.explanation.push(c),
                    KeyCode::Enter => state.explanation.push('\n'),
                    KeyCode::Backspace => {
                        state.explanation.pop();
                    }
                    _ => {}
                },
            },
        }
        Ok(Screen::Evaluate(state))
    }

    fn on_view_opinions(&mut self, mut state: ViewState, key: KeyEvent) -> Screen {
        match key.code {
            KeyCode::Up => state.scroll = state.scroll.saturating_sub(1),
            KeyCode::Down => state.scroll = state.scroll.saturating_add(1),
            KeyCode::PageUp => state.scroll = state.scroll.saturating_sub(10),
            KeyCode::PageDown => state.scroll = state.scroll.saturating_add(10),
            // Return to the picker; the session stays alive for the next
            // indicator.
            KeyCode::Esc | KeyCode::Enter => {
                return Screen::SelectIndicator {
                    identity: None,
                    cursor: 0,
                };
            }
            _ => {}
        }
        Screen::ViewOpinions(state)
    }

    /// Build the report payload for one indicator: rebuild the index,
    /// resolve every creator, render. Runs synchronously before the
    /// screen switches, so the index never outlives a bundle change.
    fn build_view(&self, indicator: &Indicator) -> Result<ViewState> {
        let index = QueryIndex::new(&self.bundle);
        let opinions = index.opinions_for(&indicator.id);
        let mut entries = Vec::with_capacity(opinions.len());
        for opinion in opinions {
            entries.push((opinion, index.creator_of(opinion)?));
        }
        Ok(ViewState {
            title: format!("Opinions: {} ({})", indicator.display_name(), indicator.id),
            report: report::render_report(entries),
            scroll: 0,
        })
    }

    /// Write the bundle back out. Best-effort: a failure propagates as a
    /// fatal error but the in-memory append is not undone.
    fn save_bundle(&self) -> Result<()> {
        if let Flow::Judge { output } = &self.flow {
            self.bundle.save_to_path(output)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opine_model::Object;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn values() -> Vec<String> {
        opine_model::OPINION_VALUES
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    fn authoring_bundle() -> Bundle {
        Bundle::parse(
            r#"{
                "type": "bundle",
                "id": "bundle--0001",
                "objects": [
                    {
                        "type": "identity",
                        "id": "identity--0001",
                        "created": "2020-01-01T00:00:00.000Z",
                        "modified": "2020-01-01T00:00:00.000Z",
                        "name": "Casey Analyst",
                        "identity_class": "individual"
                    },
                    {
                        "type": "indicator",
                        "id": "indicator--0001",
                        "name": "Suspicious domain watchlist"
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    fn judge_app(output: &std::path::Path) -> App {
        App::new(
            Flow::Judge {
                output: output.to_path_buf(),
            },
            authoring_bundle(),
            values(),
        )
    }

    #[test]
    fn authoring_scenario_appends_one_opinion_and_saves() {
        let out = tempfile::NamedTempFile::new().unwrap();
        let mut app = judge_app(out.path());

        // Row 0 is NEW IDENTITY; row 1 is the existing analyst.
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(
            app.screen,
            Screen::SelectIndicator {
                identity: Some(_),
                ..
            }
        ));

        // Pick the only indicator.
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(app.screen, Screen::Evaluate(_)));

        // Move from strongly-disagree down to agree, then explain.
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Down)).unwrap();
        app.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut app, "works well");
        app.handle_key(ctrl('s')).unwrap();

        assert!(!app.running);
        assert_eq!(app.bundle.objects.len(), 3);
        let Object::Opinion(ref opinion) = app.bundle.objects[2] else {
            panic!("expected appended opinion last");
        };
        assert_eq!(opinion.opinion, "agree");
        assert_eq!(opinion.explanation, "works well");
        assert_eq!(opinion.object_refs, vec!["indicator--0001".to_string()]);
        assert_eq!(opinion.created_by_ref.as_deref(), Some("identity--0001"));

        // The saved file reloads with the same content.
        let reloaded = Bundle::from_path(out.path()).unwrap();
        assert_eq!(reloaded.objects.len(), 3);
    }

    #[test]
    fn new_identity_is_committed_before_indicator_capture() {
        let out = tempfile::NamedTempFile::new().unwrap();
        let mut app = judge_app(out.path());

        // Row 0: NEW IDENTITY.
        app.handle_key(key(KeyCode::Enter)).unwrap();
        assert!(matches!(app.screen, Screen::NewIdentity(_)));

        type_text(&mut app, "Riley");
        app.handle_key(key(KeyCode::Tab)).unwrap();
        type_text(&mut app, "riley@example.com");
        app.handle_key(key(KeyCode::Enter)).unwrap();

        // Identity already appended, before any indicator was chosen.
        assert_eq!(app.bundle.objects.len(), 3);
        assert!(matches!(
            app.screen,
            Screen::SelectIndicator {
                identity: Some(_),
                ..
            }
        ));

        // Cancelling evaluation discards the opinion, not the identity.
        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(app.screen, Screen::SelectIdentity { .. }));
        assert_eq!(app.bundle.objects.len(), 3);
        assert!(app.running);
    }

    #[test]
    fn cancel_from_new_identity_returns_to_selection() {
        let out = tempfile::NamedTempFile::new().unwrap();
        let mut app = judge_app(out.path());

        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(app.screen, Screen::SelectIdentity { .. }));
        assert_eq!(app.bundle.objects.len(), 2);
        assert!(app.running);
    }

    #[test]
    fn cancel_at_entry_screen_terminates() {
        let out = tempfile::NamedTempFile::new().unwrap();
        let mut app = judge_app(out.path());
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!app.running);
    }

    #[test]
    fn empty_indicator_list_only_cancels() {
        let bundle = Bundle::parse(r#"{"type": "bundle", "id": "bundle--1", "objects": []}"#)
            .unwrap();
        let mut app = App::new(Flow::Read, bundle, values());

        // Nothing to select: Enter and navigation are no-ops.
        app.handle_key(key(KeyCode::Enter)).unwrap();
        app.handle_key(key(KeyCode::Down)).unwrap();
        assert!(matches!(app.screen, Screen::SelectIndicator { .. }));
        assert!(app.running);

        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(!app.running);
    }

    #[test]
    fn review_renders_most_recent_first_and_returns() {
        let mut bundle = authoring_bundle();
        let older = {
            let mut o = Opinion::new("indicator--0001", "disagree", "noisy", "identity--0001");
            o.created = chrono::DateTime::parse_from_rfc3339("2020-06-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc);
            o
        };
        let newer = {
            let mut o = Opinion::new("indicator--0001", "agree", "works well", "identity--0001");
            o.created = chrono::DateTime::parse_from_rfc3339("2021-06-01T00:00:00Z")
                .unwrap()
                .with_timezone(&chrono::Utc);
            o
        };
        bundle.append_opinion(older);
        bundle.append_opinion(newer);

        let mut app = App::new(Flow::Read, bundle, values());
        app.handle_key(key(KeyCode::Enter)).unwrap();

        let Screen::ViewOpinions(ref view) = app.screen else {
            panic!("expected opinion view");
        };
        let agree_at = view.report.find("Opinion on effectiveness: Agree").unwrap();
        let disagree_at = view
            .report
            .find("Opinion on effectiveness: Disagree")
            .unwrap();
        assert!(agree_at < disagree_at);

        // Return is re-enterable, not terminal.
        app.handle_key(key(KeyCode::Esc)).unwrap();
        assert!(matches!(app.screen, Screen::SelectIndicator { .. }));
        assert!(app.running);
    }

    #[test]
    fn review_of_unopined_indicator_renders_empty_report() {
        let mut app = App::new(Flow::Read, authoring_bundle(), values());
        app.handle_key(key(KeyCode::Enter)).unwrap();
        let Screen::ViewOpinions(ref view) = app.screen else {
            panic!("expected opinion view");
        };
        assert_eq!(view.report, "");
    }

    #[test]
    fn unresolvable_creator_is_fatal_for_the_view() {
        let mut bundle = authoring_bundle();
        bundle.append_opinion(Opinion::new(
            "indicator--0001",
            "agree",
            "",
            "identity--missing",
        ));
        let mut app = App::new(Flow::Read, bundle, values());
        let err = app.handle_key(key(KeyCode::Enter)).unwrap_err();
        assert!(err.to_string().contains("identity--missing"));
    }

    #[test]
    fn picker_labels_carry_name_then_indented_id() {
        let bundle = authoring_bundle();
        let index = QueryIndex::new(&bundle);
        let indicator = index.indicators()[0];
        assert_eq!(
            indicator_label(indicator),
            "Suspicious domain watchlist\n\tindicator--0001"
        );
        let identity = index.identities()[0];
        assert_eq!(
            identity_label(identity),
            "Individual: Casey Analyst\n\tidentity--0001"
        );
    }
}
