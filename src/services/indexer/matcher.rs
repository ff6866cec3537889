//! Alert rule matching.
//!
//! Rules are scanned in list order and the first enabled rule for the account
//! whose condition holds wins. There is no priority field; position is the
//! tie-break.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{AlertDirection, AlertRule, AlertType, SignedAmount};

/// Whether `rule` fires for `delta`, ignoring account and enabled flag.
///
/// `custom` rules never match, nor do drop/increase rules paired with the
/// opposite direction.
pub fn rule_condition_holds(rule: &AlertRule, delta: &SignedAmount) -> bool {
	match (rule.rule_type, rule.direction) {
		(AlertType::BalanceDrop, AlertDirection::Below) => {
			delta.is_negative() && delta.magnitude() >= rule.threshold
		}
		(AlertType::BalanceIncrease, AlertDirection::Above) => {
			delta.is_positive() && delta.magnitude() >= rule.threshold
		}
		(AlertType::LargeTransaction, _) => delta.magnitude() >= rule.threshold,
		_ => false,
	}
}

/// Returns the first enabled rule for `account_id` that matches `delta`.
pub fn find_matching_rule<'a>(
	account_id: &str,
	delta: &SignedAmount,
	rules: &'a [AlertRule],
) -> Option<&'a AlertRule> {
	rules.iter().find(|rule| {
		rule.enabled && rule.account_id == account_id && rule_condition_holds(rule, delta)
	})
}

/// Shared, externally mutable alert rule list.
///
/// The indexer reads the current list on every evaluation, so edits made
/// through any clone apply to the next movement.
#[derive(Debug, Clone, Default)]
pub struct AlertRules {
	rules: Arc<RwLock<Vec<AlertRule>>>,
}

impl AlertRules {
	pub fn new(rules: Vec<AlertRule>) -> Self {
		Self {
			rules: Arc::new(RwLock::new(rules)),
		}
	}

	/// Copy of the current list
	pub async fn snapshot(&self) -> Vec<AlertRule> {
		self.rules.read().await.clone()
	}

	/// Replaces the whole list
	pub async fn replace(&self, rules: Vec<AlertRule>) {
		*self.rules.write().await = rules;
	}

	/// Appends a rule at the lowest precedence
	pub async fn push(&self, rule: AlertRule) {
		self.rules.write().await.push(rule);
	}

	/// Removes every rule with `rule_id`; returns whether any was removed
	pub async fn remove(&self, rule_id: &str) -> bool {
		let mut rules = self.rules.write().await;
		let before = rules.len();
		rules.retain(|rule| rule.id != rule_id);
		rules.len() != before
	}

	/// Sets the enabled flag of `rule_id`; returns whether the rule exists
	pub async fn set_enabled(&self, rule_id: &str, enabled: bool) -> bool {
		let mut rules = self.rules.write().await;
		match rules.iter_mut().find(|rule| rule.id == rule_id) {
			Some(rule) => {
				rule.enabled = enabled;
				true
			}
			None => false,
		}
	}

	pub async fn len(&self) -> usize {
		self.rules.read().await.len()
	}

	pub async fn is_empty(&self) -> bool {
		self.rules.read().await.is_empty()
	}

	/// First match against the current list
	pub async fn find_match(&self, account_id: &str, delta: &SignedAmount) -> Option<AlertRule> {
		let rules = self.rules.read().await;
		find_matching_rule(account_id, delta, &rules).cloned()
	}
}
