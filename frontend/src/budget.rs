//! In-place budget edits: the form posts to the server and the matching
//! amount line and progress bar are patched from the JSON answer.

use std::cell::Cell;

use serde::Deserialize;

use crate::currency::CurrencyFormatter;
use crate::error::RequestError;
use crate::http::{self, Acknowledgement, RawResponse};

pub const FORM_SELECTOR: &str = "form.budget-edit-form";

/// The element ids a budget form writes to, taken from its data attributes.
///
/// A form without `data-budget-id` still posts through AJAX; it just has no
/// conventional targets to update.
#[derive(Clone, Debug, PartialEq)]
pub struct BudgetBinding {
    pub budget_id: Option<String>,
    pub amounts_id: Option<String>,
    pub progress_id: Option<String>,
}

impl BudgetBinding {
    /// Reads `data-budget-id` and the optional `data-amounts-target` and
    /// `data-progress-target` overrides.
    pub fn from_data<F>(data: F) -> BudgetBinding
    where
        F: Fn(&str) -> Option<String>,
    {
        let attr = |name: &str| {
            data(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let budget_id = attr("data-budget-id");
        let conventional = |prefix: &str| budget_id.as_ref().map(|id| format!("{prefix}{id}"));

        BudgetBinding {
            amounts_id: attr("data-amounts-target").or_else(|| conventional("budgetAmounts")),
            progress_id: attr("data-progress-target").or_else(|| conventional("budgetProgress")),
            budget_id,
        }
    }

    /// Name used in log lines.
    pub fn label(&self) -> &str {
        self.budget_id.as_deref().unwrap_or("(unbound)")
    }
}

/// The JSON the server sends back for an AJAX budget edit.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BudgetUpdateResponse {
    #[serde(default)]
    pub success: bool,
    pub spent: Option<f64>,
    pub available: Option<f64>,
    pub percent: Option<f64>,
    /// The new monthly limit.
    pub amount: Option<f64>,
    pub rollover: Option<bool>,
    #[serde(alias = "error")]
    pub message: Option<String>,
}

impl Acknowledgement for BudgetUpdateResponse {
    fn success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<String> {
        self.message.clone()
    }
}

impl BudgetUpdateResponse {
    pub fn from_raw(raw: &RawResponse) -> Result<BudgetUpdateResponse, RequestError> {
        http::decode_acknowledged(raw)
    }
}

/// Everything the page needs to show after a successful edit.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSnapshot {
    pub amounts_text: String,
    pub percent: i64,
}

impl BudgetSnapshot {
    pub fn from_response(
        response: &BudgetUpdateResponse,
        formatter: &CurrencyFormatter,
    ) -> Result<BudgetSnapshot, RequestError> {
        let field = |value: Option<f64>, name: &str| {
            value.ok_or_else(|| RequestError::Decode(format!("missing field `{name}`")))
        };
        let spent = field(response.spent, "spent")?;
        let available = field(response.available, "available")?;
        let percent = field(response.percent, "percent")?;

        Ok(BudgetSnapshot {
            amounts_text: format!(
                "{} / {}",
                formatter.format(spent),
                formatter.format(available)
            ),
            percent: round_percent(percent),
        })
    }

    pub fn progress_label(&self) -> String {
        format!("{}%", self.percent)
    }

    pub fn progress_width(&self) -> String {
        self.progress_label()
    }
}

/// Rounds like JavaScript's `Math.round`: halves go towards +∞. Values
/// outside 0..=100 are kept.
pub fn round_percent(percent: f64) -> i64 {
    let rounded = percent.round();
    // `f64::round` sends negative halves away from zero.
    if percent - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

/// Text shown in the blocking alert when an edit fails.
pub fn failure_message(err: &RequestError) -> String {
    match err {
        RequestError::Rejected { message: Some(message) } if !message.trim().is_empty() => {
            format!("Failed to update budget: {}", message.trim())
        }
        RequestError::Rejected { .. } => "Failed to update budget".to_string(),
        transport => format!("Error updating budget: {}", transport.reason()),
    }
}

/// Sends the form to the server.
pub trait BudgetEndpoint {
    async fn post_update(&self) -> Result<BudgetUpdateResponse, RequestError>;
}

/// Element lookup for the amount line and the progress bar.
pub trait BudgetNodes {
    type Node;

    fn find(&self, id: &str) -> Option<Self::Node>;
    fn set_text(&self, node: &Self::Node, text: &str);
    /// Sets the bar's width, `aria-valuenow` and visible label.
    fn set_progress(&self, node: &Self::Node, width: &str, value: i64, label: &str);
}

/// Writes the new figures into the bound elements. Targets that are unbound
/// or not on the page are skipped. Returns how many elements were updated.
pub fn apply_snapshot<N: BudgetNodes>(
    nodes: &N,
    binding: &BudgetBinding,
    snapshot: &BudgetSnapshot,
) -> usize {
    let mut updated = 0;

    match binding.amounts_id.as_deref().map(|id| (id, nodes.find(id))) {
        Some((_, Some(amounts))) => {
            nodes.set_text(&amounts, &snapshot.amounts_text);
            updated += 1;
        }
        Some((id, None)) => log::debug!("no #{id} on the page"),
        None => {}
    }

    match binding.progress_id.as_deref().map(|id| (id, nodes.find(id))) {
        Some((_, Some(progress))) => {
            nodes.set_progress(
                &progress,
                &snapshot.progress_width(),
                snapshot.percent,
                &snapshot.progress_label(),
            );
            updated += 1;
        }
        Some((id, None)) => log::debug!("no #{id} on the page"),
        None => {}
    }

    updated
}

/// The parts of the page a budget form touches.
pub trait BudgetPage: BudgetNodes {
    fn close_modal(&self);
    fn set_pending(&self, pending: bool);
    fn alert(&self, message: &str);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Applied(BudgetSnapshot),
    Failed(RequestError),
    /// A submission was already in flight.
    Ignored,
}

/// One budget-edit form on the page.
pub struct BudgetForm<E, P> {
    binding: BudgetBinding,
    endpoint: E,
    page: P,
    formatter: CurrencyFormatter,
    phase: Cell<FormPhase>,
}

impl<E: BudgetEndpoint, P: BudgetPage> BudgetForm<E, P> {
    pub fn new(binding: BudgetBinding, endpoint: E, page: P, formatter: CurrencyFormatter) -> Self {
        Self {
            binding,
            endpoint,
            page,
            formatter,
            phase: Cell::new(FormPhase::Idle),
        }
    }

    pub async fn submit(&self) -> SubmitOutcome {
        if self.phase.replace(FormPhase::Submitting) == FormPhase::Submitting {
            log::debug!(
                "budget {} is already being saved, ignoring submit",
                self.binding.label()
            );
            return SubmitOutcome::Ignored;
        }
        self.page.set_pending(true);

        let result = self.endpoint.post_update().await.and_then(|response| {
            if let Some(amount) = response.amount {
                log::debug!(
                    "budget {} limit is now {amount} (rollover: {})",
                    self.binding.label(),
                    response.rollover.unwrap_or(false)
                );
            }
            BudgetSnapshot::from_response(&response, &self.formatter)
        });

        let outcome = match result {
            Ok(snapshot) => {
                apply_snapshot(&self.page, &self.binding, &snapshot);
                self.page.close_modal();
                log::info!(
                    "budget {} updated: {} ({}%)",
                    self.binding.label(),
                    snapshot.amounts_text,
                    snapshot.percent
                );
                SubmitOutcome::Applied(snapshot)
            }
            Err(err) => {
                let kind = if err.is_transport() { "transport" } else { "application" };
                log::error!(
                    "updating budget {} failed ({kind} error): {err}",
                    self.binding.label()
                );
                self.page.alert(&failure_message(&err));
                SubmitOutcome::Failed(err)
            }
        };

        self.page.set_pending(false);
        self.phase.set(FormPhase::Idle);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use futures::executor::block_on;

    use super::*;
    use crate::currency::CurrencyCode;

    #[derive(Debug, Clone, PartialEq)]
    enum Effect {
        Text(String, String),
        Progress(String, String, i64, String),
        CloseModal,
        Pending(bool),
        Alert(String),
    }

    /// A page holding only the element ids in `present`.
    #[derive(Clone)]
    struct FakePage {
        present: Vec<&'static str>,
        effects: Rc<RefCell<Vec<Effect>>>,
    }

    impl FakePage {
        fn with_nodes(present: &[&'static str]) -> Self {
            Self {
                present: present.to_vec(),
                effects: Rc::default(),
            }
        }

        fn effects(&self) -> Vec<Effect> {
            self.effects.borrow().clone()
        }
    }

    impl BudgetNodes for FakePage {
        type Node = String;

        fn find(&self, id: &str) -> Option<String> {
            self.present.contains(&id).then(|| id.to_string())
        }

        fn set_text(&self, node: &String, text: &str) {
            self.effects
                .borrow_mut()
                .push(Effect::Text(node.clone(), text.to_string()));
        }

        fn set_progress(&self, node: &String, width: &str, value: i64, label: &str) {
            self.effects.borrow_mut().push(Effect::Progress(
                node.clone(),
                width.to_string(),
                value,
                label.to_string(),
            ));
        }
    }

    impl BudgetPage for FakePage {
        fn close_modal(&self) {
            self.effects.borrow_mut().push(Effect::CloseModal);
        }

        fn set_pending(&self, pending: bool) {
            self.effects.borrow_mut().push(Effect::Pending(pending));
        }

        fn alert(&self, message: &str) {
            self.effects
                .borrow_mut()
                .push(Effect::Alert(message.to_string()));
        }
    }

    struct FakeEndpoint {
        result: Result<BudgetUpdateResponse, RequestError>,
    }

    impl BudgetEndpoint for FakeEndpoint {
        async fn post_update(&self) -> Result<BudgetUpdateResponse, RequestError> {
            self.result.clone()
        }
    }

    fn binding() -> BudgetBinding {
        BudgetBinding::from_data(|name| (name == "data-budget-id").then(|| "7".to_string()))
    }

    fn usd() -> CurrencyFormatter {
        CurrencyFormatter::new(CurrencyCode::parse("USD").unwrap())
    }

    fn response(json: &str) -> BudgetUpdateResponse {
        serde_json::from_str(json).unwrap()
    }

    fn form_on(
        binding: BudgetBinding,
        page: FakePage,
        result: Result<BudgetUpdateResponse, RequestError>,
    ) -> BudgetForm<FakeEndpoint, FakePage> {
        BudgetForm::new(binding, FakeEndpoint { result }, page, usd())
    }

    fn form_with(
        result: Result<BudgetUpdateResponse, RequestError>,
    ) -> (BudgetForm<FakeEndpoint, FakePage>, FakePage) {
        let page = FakePage::with_nodes(&["budgetAmounts7", "budgetProgress7"]);
        (form_on(binding(), page.clone(), result), page)
    }

    #[test]
    fn binding_uses_conventional_ids() {
        let binding = binding();
        assert_eq!(binding.budget_id.as_deref(), Some("7"));
        assert_eq!(binding.amounts_id.as_deref(), Some("budgetAmounts7"));
        assert_eq!(binding.progress_id.as_deref(), Some("budgetProgress7"));
        assert_eq!(binding.label(), "7");
    }

    #[test]
    fn binding_accepts_explicit_targets() {
        let data: HashMap<&str, &str> = [
            ("data-budget-id", "3"),
            ("data-amounts-target", "groceries-amounts"),
            ("data-progress-target", " "),
        ]
        .into_iter()
        .collect();
        let binding = BudgetBinding::from_data(|name| data.get(name).map(|v| v.to_string()));
        assert_eq!(binding.amounts_id.as_deref(), Some("groceries-amounts"));
        assert_eq!(binding.progress_id.as_deref(), Some("budgetProgress3"));
    }

    #[test]
    fn binding_without_budget_id_has_no_conventional_targets() {
        let unbound = BudgetBinding::from_data(|_| Some("  ".to_string()));
        assert_eq!(
            unbound,
            BudgetBinding {
                budget_id: None,
                amounts_id: None,
                progress_id: None,
            }
        );
        assert_eq!(unbound.label(), "(unbound)");

        let overridden = BudgetBinding::from_data(|name| {
            (name == "data-progress-target").then(|| "bar".to_string())
        });
        assert_eq!(overridden.amounts_id, None);
        assert_eq!(overridden.progress_id.as_deref(), Some("bar"));
    }

    #[test]
    fn success_renders_amounts_and_progress() {
        let (form, page) = form_with(Ok(response(
            r#"{"success": true, "spent": 450, "available": 50, "percent": 90}"#,
        )));

        let outcome = block_on(form.submit());

        let expected = BudgetSnapshot {
            amounts_text: "$450.00 / $50.00".to_string(),
            percent: 90,
        };
        assert_eq!(expected.progress_label(), "90%");
        assert_eq!(outcome, SubmitOutcome::Applied(expected));
        assert_eq!(
            page.effects(),
            vec![
                Effect::Pending(true),
                Effect::Text("budgetAmounts7".to_string(), "$450.00 / $50.00".to_string()),
                Effect::Progress(
                    "budgetProgress7".to_string(),
                    "90%".to_string(),
                    90,
                    "90%".to_string()
                ),
                Effect::CloseModal,
                Effect::Pending(false),
            ]
        );
        assert_eq!(form.phase.get(), FormPhase::Idle);
    }

    #[test]
    fn missing_nodes_are_skipped_and_the_modal_still_closes() {
        let page = FakePage::with_nodes(&[]);
        let form = form_on(
            binding(),
            page.clone(),
            Ok(response(r#"{"success": true, "spent": 5, "available": 95, "percent": 5}"#)),
        );

        let outcome = block_on(form.submit());

        assert!(matches!(outcome, SubmitOutcome::Applied(_)));
        assert_eq!(
            page.effects(),
            vec![Effect::Pending(true), Effect::CloseModal, Effect::Pending(false)]
        );
    }

    #[test]
    fn only_present_nodes_are_updated() {
        let page = FakePage::with_nodes(&["budgetProgress7"]);
        let snapshot = BudgetSnapshot {
            amounts_text: "$1.00 / $2.00".to_string(),
            percent: 33,
        };

        assert_eq!(apply_snapshot(&page, &binding(), &snapshot), 1);
        assert_eq!(
            page.effects(),
            vec![Effect::Progress(
                "budgetProgress7".to_string(),
                "33%".to_string(),
                33,
                "33%".to_string()
            )]
        );
    }

    #[test]
    fn unbound_form_still_posts_and_closes_its_modal() {
        let page = FakePage::with_nodes(&["budgetAmounts", "budgetProgress"]);
        let form = form_on(
            BudgetBinding::from_data(|_| None),
            page.clone(),
            Ok(response(r#"{"success": true, "spent": 5, "available": 95, "percent": 5}"#)),
        );

        let outcome = block_on(form.submit());

        assert!(matches!(outcome, SubmitOutcome::Applied(_)));
        assert_eq!(
            page.effects(),
            vec![Effect::Pending(true), Effect::CloseModal, Effect::Pending(false)]
        );
    }

    #[test]
    fn rejection_alerts_without_touching_the_view() {
        let (form, page) = form_with(Err(RequestError::Rejected { message: None }));

        let outcome = block_on(form.submit());

        assert_eq!(
            outcome,
            SubmitOutcome::Failed(RequestError::Rejected { message: None })
        );
        assert_eq!(
            page.effects(),
            vec![
                Effect::Pending(true),
                Effect::Alert("Failed to update budget".to_string()),
                Effect::Pending(false),
            ]
        );
    }

    #[test]
    fn network_failure_alerts_with_transport_message() {
        let (form, page) = form_with(Err(RequestError::Network("TypeError: Failed to fetch".to_string())));

        block_on(form.submit());

        assert!(page.effects().contains(&Effect::Alert(
            "Error updating budget: the server could not be reached".to_string()
        )));
        assert!(!page
            .effects()
            .iter()
            .any(|effect| matches!(
                effect,
                Effect::Text(..) | Effect::Progress(..) | Effect::CloseModal
            )));
        assert_eq!(form.phase.get(), FormPhase::Idle);
    }

    #[test]
    fn success_without_figures_is_a_decode_failure() {
        let (form, page) = form_with(Ok(response(r#"{"success": true, "spent": 10}"#)));

        let outcome = block_on(form.submit());

        assert!(matches!(outcome, SubmitOutcome::Failed(RequestError::Decode(_))));
        assert!(page.effects().contains(&Effect::Alert(
            "Error updating budget: the server sent an unexpected response".to_string()
        )));
    }

    #[test]
    fn resubmitting_while_in_flight_is_ignored() {
        let (form, page) = form_with(Ok(response(
            r#"{"success": true, "spent": 1, "available": 2, "percent": 50}"#,
        )));
        form.phase.set(FormPhase::Submitting);

        let outcome = block_on(form.submit());

        assert_eq!(outcome, SubmitOutcome::Ignored);
        assert!(page.effects().is_empty());
        assert_eq!(form.phase.get(), FormPhase::Submitting);
    }

    #[test]
    fn percent_rounds_like_math_round_without_clamping() {
        assert_eq!(round_percent(89.5), 90);
        assert_eq!(round_percent(89.49), 89);
        assert_eq!(round_percent(0.0), 0);
        assert_eq!(round_percent(-2.5), -2);
        assert_eq!(round_percent(133.3), 133);
        assert_eq!(round_percent(2.5), 3);
        assert_eq!(round_percent(-0.5), 0);
    }

    #[test]
    fn percent_just_below_a_half_rounds_down() {
        assert_eq!(round_percent(0.49999999999999994), 0);
        assert_eq!(round_percent(-0.49999999999999994), 0);
        assert_eq!(round_percent(99.49999999999999), 99);
    }

    #[test]
    fn snapshot_uses_rounded_percent_everywhere() {
        let snapshot =
            BudgetSnapshot::from_response(&response(r#"{"success": true, "spent": 0.5, "available": 2000, "percent": 66.6}"#), &usd())
                .unwrap();
        assert_eq!(snapshot.amounts_text, "$0.50 / $2,000.00");
        assert_eq!(snapshot.percent, 67);
        assert_eq!(snapshot.progress_width(), "67%");
        assert_eq!(snapshot.progress_label(), "67%");
    }

    #[test]
    fn server_messages_reach_the_user() {
        let err = RequestError::Rejected {
            message: Some("Not authorized".to_string()),
        };
        assert_eq!(failure_message(&err), "Failed to update budget: Not authorized");
        assert_eq!(
            failure_message(&RequestError::Status(500)),
            "Error updating budget: the server responded with status 500"
        );
    }

    #[test]
    fn response_accepts_error_alias_and_extra_fields() {
        let parsed = response(r#"{"success": false, "error": "bad amount", "rollover": true}"#);
        assert_eq!(parsed.message.as_deref(), Some("bad amount"));
        assert_eq!(parsed.rollover, Some(true));

        let raw = RawResponse {
            status: 200,
            ok: true,
            body: r#"{"success": false}"#.to_string(),
        };
        assert_eq!(
            BudgetUpdateResponse::from_raw(&raw),
            Err(RequestError::Rejected { message: None })
        );
    }
}
