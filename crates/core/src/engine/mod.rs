//! Quote orchestration. One call prices a validated cart against an
//! already-fetched catalog snapshot and optional promotion bundle.
//!
//! The computation is pure and synchronous: no I/O, no shared state, no
//! hidden clock. The caller supplies `now` for the promotion admissibility
//! check, so identical inputs always produce identical output. Order
//! creation re-runs the same computation server-side before persisting; a
//! client-submitted quote is never trusted.

pub mod category;
pub mod conditions;
pub mod price;
pub mod scope;

mod actions;
mod upsize;

use chrono::{DateTime, Utc};
use tracing::{debug, info_span};

use crate::catalog::{CatalogSnapshot, PromotionBundle};
use crate::config::EngineConfig;
use crate::domain::cart::QuoteRequest;
use crate::domain::promotion::{ActionTarget, PromotionKind, Rule, RuleAction};
use crate::domain::quote::{OrderTotals, QuoteDiagnostics, QuoteResult};
use crate::domain::Money;
use crate::records::RecordWarning;

use self::actions::{apply_action, ActionEffects, WorkingLine};
use self::conditions::{conditions_met, CartFacts};
use self::price::PriceResolver;
use self::scope::{LineIdentity, ScopeResolver};
use self::upsize::apply_free_upsize;

#[derive(Clone, Debug)]
pub struct QuoteInput<'a> {
    /// Already validated via [`crate::validate::validate_request`].
    pub request: &'a QuoteRequest,
    pub snapshot: &'a CatalogSnapshot,
    /// Promotion resolved from the request's code by the calling layer.
    /// `None` when the code did not resolve; an inadmissible promotion is
    /// treated the same way.
    pub promotion: Option<&'a PromotionBundle>,
}

pub struct QuoteEngine {
    config: EngineConfig,
}

impl QuoteEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn quote(&self, input: QuoteInput<'_>, now: DateTime<Utc>) -> QuoteResult {
        let span = info_span!("quote", lines = input.request.lines.len());
        let _enter = span.enter();

        let resolver = PriceResolver::new(input.snapshot);
        let mut lines = self.price_lines(&input, &resolver);

        let mut diagnostics = QuoteDiagnostics::default();
        let mut warnings: Vec<RecordWarning> = Vec::new();
        let mut effects = ActionEffects::default();

        let bundle =
            input.promotion.filter(|bundle| bundle.promotion.admissible_at(now));
        if let Some(bundle) = bundle {
            warnings.extend(bundle.warnings.iter().cloned());

            let scope = ScopeResolver::new(&bundle.scopes);
            // Zero include rows means the promotion reaches nothing, even
            // through whole-order actions.
            if scope.has_includes() {
                mark_eligibility(&mut lines, input.snapshot, &scope, input.request);

                if bundle.promotion.id.0 == self.config.legacy_upsize_code {
                    diagnostics.special_rule_applied =
                        apply_free_upsize(&self.config, &mut lines, &resolver);
                } else {
                    for rule in effective_rules(bundle) {
                        let facts = cart_facts(&lines);
                        if !conditions_met(rule.conditions.as_ref(), &facts) {
                            continue;
                        }
                        for action in &rule.actions {
                            apply_action(action, &mut lines, input.snapshot, &mut effects);
                        }
                    }
                }
            }
        }

        diagnostics.eligible_quantity =
            lines.iter().filter(|line| line.eligible).map(|line| line.quantity).sum();
        diagnostics.unallocated_discount = effects.unallocated;
        warnings.extend(effects.warnings.drain(..));
        diagnostics.warnings = warnings.iter().map(RecordWarning::render).collect();

        fold(lines, effects.free_lines, diagnostics)
    }

    fn price_lines(&self, input: &QuoteInput<'_>, resolver: &PriceResolver<'_>) -> Vec<WorkingLine> {
        input
            .request
            .lines
            .iter()
            .map(|cart| {
                let product = input.snapshot.product(&cart.product_id);
                let category = category::normalize(product.and_then(|p| p.category.as_deref()));
                let price = resolver.resolve(&cart.product_id, cart.size);
                let unit = price.unwrap_or(0);
                if self.config.trace_lines {
                    debug!(
                        line = %cart.line_id.0,
                        product = %cart.product_id.0,
                        size = cart.size.as_str(),
                        unit_price = unit,
                        missing = price.is_none(),
                        "priced line"
                    );
                }
                WorkingLine {
                    line_id: cart.line_id.clone(),
                    product_id: cart.product_id.clone(),
                    quantity: cart.quantity,
                    display_size: cart.size,
                    charged_size: cart.size,
                    unit_price_before: unit,
                    line_total_before: unit * Money::from(cart.quantity),
                    line_total_after: unit * Money::from(cart.quantity),
                    adjustments: Vec::new(),
                    missing_price: price.is_none(),
                    eligible: false,
                    category,
                }
            })
            .collect()
    }
}

fn mark_eligibility(
    lines: &mut [WorkingLine],
    snapshot: &CatalogSnapshot,
    scope: &ScopeResolver,
    request: &QuoteRequest,
) {
    for (line, cart) in lines.iter_mut().zip(&request.lines) {
        let product = snapshot.product(&cart.product_id);
        let identity = LineIdentity {
            variant_id: product
                .and_then(|p| p.variant_for(cart.size))
                .map(|variant| variant.id.clone()),
            product_id: cart.product_id.clone(),
            subsection: product.and_then(|p| p.subsection.clone()),
            category: line.category,
        };
        // Lines without a resolvable price never participate in discounts.
        line.eligible = !line.missing_price && scope.is_eligible(&identity);
    }
}

/// A plain-percentage promotion behaves as a single unconditional rule over
/// the eligible lines; rule-based promotions use their stored records.
///
/// Rules fire in ascending `order_index` no matter how the bundle was
/// assembled, so the sort here does not rely on the records decode path.
fn effective_rules(bundle: &PromotionBundle) -> Vec<Rule> {
    match &bundle.promotion.kind {
        PromotionKind::Plain { percent } => vec![Rule {
            order_index: 0,
            conditions: None,
            actions: vec![RuleAction::PercentOff {
                percent: *percent,
                target: ActionTarget::EligibleLines,
            }],
        }],
        PromotionKind::RuleBased => {
            let mut rules = bundle.rules.clone();
            rules.sort_by_key(|rule| rule.order_index);
            rules
        }
    }
}

/// Facts are recomputed before each rule, so later rules see the subtotal
/// left by earlier ones. Fired rules compose; a line may be discounted by
/// several rules in order.
fn cart_facts(lines: &[WorkingLine]) -> CartFacts {
    CartFacts {
        subtotal: lines.iter().map(|line| line.line_total_after).sum(),
        total_quantity: lines.iter().map(|line| line.quantity).sum(),
        eligible_quantity: lines
            .iter()
            .filter(|line| line.eligible)
            .map(|line| line.quantity)
            .sum(),
    }
}

fn fold(
    lines: Vec<WorkingLine>,
    free_lines: Vec<WorkingLine>,
    diagnostics: QuoteDiagnostics,
) -> QuoteResult {
    let subtotal_before: Money = lines.iter().map(|line| line.line_total_before).sum();
    let grand_total: Money = lines.iter().map(|line| line.line_total_after).sum();
    let line_discounts: Money =
        lines.iter().map(|line| line.line_total_before - line.line_total_after).sum();
    let free_discounts: Money = free_lines
        .iter()
        .map(|line| line.line_total_before - line.line_total_after)
        .sum();

    QuoteResult {
        lines: lines.into_iter().map(WorkingLine::into_quoted).collect(),
        free_items: free_lines.into_iter().map(WorkingLine::into_quoted).collect(),
        totals: OrderTotals {
            subtotal_before,
            discount_total: line_discounts + free_discounts,
            grand_total,
        },
        diagnostics,
    }
}
