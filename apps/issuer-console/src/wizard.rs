// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Deployment Wizard
//!
//! Three steps, walked strictly in order:
//!
//! 1. **Asset Details**: custody model, network, name and symbol
//! 2. **Capital Structure**: the tranche (partition) names
//! 3. **Review & Sign**: summary; confirming hands a [`DeploySpec`] to the
//!    deployment workflow
//!
//! A wizard only ever produces a deployment through [`Wizard::confirm`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::blockchain::encoding::encode_partition;
use crate::blockchain::Chain;
use crate::error::ValidationError;
use crate::models::CustodyMode;
use crate::workflow::DeploySpec;

pub const DEFAULT_PARTITION: &str = "Class A";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    AssetDetails,
    CapitalStructure,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::AssetDetails,
        WizardStep::CapitalStructure,
        WizardStep::Review,
    ];

    /// One-based position shown in the step header.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::AssetDetails => 1,
            WizardStep::CapitalStructure => 2,
            WizardStep::Review => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            WizardStep::AssetDetails => "Asset Details",
            WizardStep::CapitalStructure => "Capital Structure",
            WizardStep::Review => "Review & Sign",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            WizardStep::AssetDetails => Some(WizardStep::CapitalStructure),
            WizardStep::CapitalStructure => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            WizardStep::AssetDetails => None,
            WizardStep::CapitalStructure => Some(WizardStep::AssetDetails),
            WizardStep::Review => Some(WizardStep::CapitalStructure),
        }
    }
}

/// Fields collected by the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TokenForm {
    pub mode: CustodyMode,
    pub chain: Chain,
    pub name: String,
    pub symbol: String,
    /// Tranche rows as typed, including blanks.
    pub partitions: Vec<String>,
}

impl Default for TokenForm {
    fn default() -> Self {
        Self {
            mode: CustodyMode::Managed,
            chain: Chain::BscBnb,
            name: String::new(),
            symbol: String::new(),
            partitions: vec![DEFAULT_PARTITION.to_string()],
        }
    }
}

impl TokenForm {
    /// Trimmed, non-empty tranche names in row order.
    pub fn valid_partitions(&self) -> Vec<String> {
        self.partitions
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn check_partitions(&self) -> Result<(), ValidationError> {
        let names = self.valid_partitions();
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(ValidationError::DuplicatePartition(name.clone()));
            }
            encode_partition(name)?;
        }
        Ok(())
    }
}

/// Partial update of the asset details step.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct DetailsUpdate {
    pub mode: Option<CustodyMode>,
    pub chain: Option<Chain>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

/// Result of stepping back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackOutcome {
    Moved(WizardStep),
    /// Back from the first step closes the wizard.
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    id: Uuid,
    step: WizardStep,
    form: TokenForm,
    created_at: DateTime<Utc>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            step: WizardStep::AssetDetails,
            form: TokenForm::default(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn form(&self) -> &TokenForm {
        &self.form
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn update_details(&mut self, update: DetailsUpdate) {
        if let Some(mode) = update.mode {
            self.form.mode = mode;
        }
        if let Some(chain) = update.chain {
            self.form.chain = chain;
        }
        if let Some(name) = update.name {
            self.form.name = name;
        }
        if let Some(symbol) = update.symbol {
            self.form.symbol = symbol;
        }
    }

    /// Append an empty tranche row.
    pub fn add_partition(&mut self) {
        self.form.partitions.push(String::new());
    }

    pub fn remove_partition(&mut self, index: usize) -> Result<(), ValidationError> {
        if index >= self.form.partitions.len() {
            return Err(ValidationError::PartitionIndex(index));
        }
        if self.form.partitions.len() == 1 {
            return Err(ValidationError::LastPartition);
        }
        self.form.partitions.remove(index);
        Ok(())
    }

    pub fn update_partition(&mut self, index: usize, value: String) -> Result<(), ValidationError> {
        let row = self
            .form
            .partitions
            .get_mut(index)
            .ok_or(ValidationError::PartitionIndex(index))?;
        *row = value;
        Ok(())
    }

    /// Name and symbol are both filled in.
    pub fn can_continue(&self) -> bool {
        !self.form.name.trim().is_empty() && !self.form.symbol.trim().is_empty()
    }

    /// Move to the next step.
    pub fn advance(&mut self) -> Result<WizardStep, ValidationError> {
        if !self.can_continue() {
            return Err(ValidationError::DetailsIncomplete);
        }
        let next = self
            .step
            .next()
            .ok_or(ValidationError::WizardStep("Already on the last step; confirm to deploy"))?;
        if self.step == WizardStep::CapitalStructure {
            self.form.check_partitions()?;
        }
        self.step = next;
        Ok(next)
    }

    pub fn back(&mut self) -> BackOutcome {
        match self.step.previous() {
            Some(previous) => {
                self.step = previous;
                BackOutcome::Moved(previous)
            }
            None => BackOutcome::Cancelled,
        }
    }

    /// Produce the deployment request. Only legal on the review step.
    pub fn confirm(&self) -> Result<DeploySpec, ValidationError> {
        if self.step != WizardStep::Review {
            return Err(ValidationError::WizardStep(
                "Deployment can only be confirmed from the review step",
            ));
        }
        if !self.can_continue() {
            return Err(ValidationError::DetailsIncomplete);
        }
        self.form.check_partitions()?;

        let partitions = self.form.valid_partitions();
        if partitions.is_empty() {
            warn!(wizard = %self.id, "Deploying a token without any partitions");
        }

        Ok(DeploySpec {
            name: self.form.name.trim().to_string(),
            symbol: self.form.symbol.trim().to_string(),
            partitions,
            chain: self.form.chain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.update_details(DetailsUpdate {
            name: Some("Fund I".into()),
            symbol: Some("FUN".into()),
            ..Default::default()
        });
        wizard
    }

    #[test]
    fn starts_on_asset_details_with_defaults() {
        let wizard = Wizard::new();
        assert_eq!(wizard.step(), WizardStep::AssetDetails);
        assert_eq!(wizard.form().mode, CustodyMode::Managed);
        assert_eq!(wizard.form().chain, Chain::BscBnb);
        assert_eq!(wizard.form().partitions, vec!["Class A"]);
        assert!(!wizard.can_continue());
    }

    #[test]
    fn cannot_continue_without_name_and_symbol() {
        let mut wizard = Wizard::new();
        wizard.update_details(DetailsUpdate {
            name: Some("Fund I".into()),
            ..Default::default()
        });
        assert!(!wizard.can_continue());
        assert_eq!(wizard.advance(), Err(ValidationError::DetailsIncomplete));
        assert_eq!(wizard.step(), WizardStep::AssetDetails);
    }

    #[test]
    fn walks_to_review_and_confirms() {
        let mut wizard = filled();
        wizard.add_partition();
        wizard.update_partition(1, "  Class B ".into()).unwrap();
        wizard.add_partition();

        assert_eq!(wizard.advance(), Ok(WizardStep::CapitalStructure));
        assert_eq!(wizard.advance(), Ok(WizardStep::Review));
        assert!(wizard.advance().is_err());

        let spec = wizard.confirm().unwrap();
        assert_eq!(spec.name, "Fund I");
        assert_eq!(spec.partitions, vec!["Class A", "Class B"]);
        assert_eq!(spec.chain, Chain::BscBnb);
    }

    #[test]
    fn confirm_is_refused_before_review() {
        let mut wizard = filled();
        assert!(wizard.confirm().is_err());
        wizard.advance().unwrap();
        assert!(wizard.confirm().is_err());
    }

    #[test]
    fn duplicate_tranches_block_leaving_capital_structure() {
        let mut wizard = filled();
        wizard.advance().unwrap();
        wizard.add_partition();
        wizard.update_partition(1, "Class A ".into()).unwrap();

        assert_eq!(
            wizard.advance(),
            Err(ValidationError::DuplicatePartition("Class A".into()))
        );
        assert_eq!(wizard.step(), WizardStep::CapitalStructure);
    }

    #[test]
    fn last_tranche_row_cannot_be_removed() {
        let mut wizard = filled();
        assert_eq!(wizard.remove_partition(0), Err(ValidationError::LastPartition));
        wizard.add_partition();
        wizard.remove_partition(0).unwrap();
        assert_eq!(wizard.form().partitions, vec![""]);
        assert_eq!(wizard.remove_partition(4), Err(ValidationError::PartitionIndex(4)));
    }

    #[test]
    fn blank_tranches_confirm_to_an_empty_list() {
        let mut wizard = filled();
        wizard.update_partition(0, "   ".into()).unwrap();
        wizard.advance().unwrap();
        wizard.advance().unwrap();

        assert!(wizard.confirm().unwrap().partitions.is_empty());
    }

    #[test]
    fn back_from_first_step_cancels() {
        let mut wizard = filled();
        wizard.advance().unwrap();
        assert_eq!(wizard.back(), BackOutcome::Moved(WizardStep::AssetDetails));
        assert_eq!(wizard.back(), BackOutcome::Cancelled);
    }
}
