use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::warn;

use super::super::collaborators::{EnhancementContext, LetterEnhancer};
use super::super::domain::{Dispute, LetterKind};
use super::bureaus::BureauDirectory;
use super::templates::{RecipientClass, TemplateLibrary};
use super::LookupError;

/// A finished letter body plus the metadata the workflow needs to persist it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedLetter {
    pub kind: LetterKind,
    pub subject: String,
    pub body: String,
    pub recipient: String,
    pub recipient_address: String,
    pub cited_section: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error("token '{{{token}}}' has no binding value")]
    UnresolvedToken { token: &'static str },
}

/// Binds templates to dispute data. Holds the immutable template and bureau
/// registries plus the optional enhancement collaborator.
pub struct LetterComposer {
    templates: TemplateLibrary,
    bureaus: BureauDirectory,
    enhancer: Option<Box<dyn LetterEnhancer>>,
    min_enhancement_ratio: f32,
}

impl LetterComposer {
    pub fn new(templates: TemplateLibrary, bureaus: BureauDirectory) -> Self {
        Self {
            templates,
            bureaus,
            enhancer: None,
            min_enhancement_ratio: 0.8,
        }
    }

    pub fn standard() -> Self {
        Self::new(TemplateLibrary::standard(), BureauDirectory::standard())
    }

    /// Attach the external text-enhancement collaborator. Enhanced output
    /// shorter than `min_ratio` of the original draft is discarded.
    pub fn with_enhancer(mut self, enhancer: Box<dyn LetterEnhancer>, min_ratio: f32) -> Self {
        self.enhancer = Some(enhancer);
        self.min_enhancement_ratio = min_ratio;
        self
    }

    pub fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Compose the letter of the given kind for a dispute. Every token the
    /// template declares must resolve; an unresolvable token rejects the
    /// whole composition rather than shipping a literal placeholder.
    pub fn compose(
        &self,
        dispute: &Dispute,
        kind: LetterKind,
        today: NaiveDate,
    ) -> Result<ComposedLetter, ComposeError> {
        let template = self.templates.lookup(dispute.dispute_type, kind)?;

        let bindings = self.bindings(dispute, today);
        let mut body = substitute(template.body, template.tokens, &bindings)?;

        let (recipient, recipient_address) = match template.recipient {
            RecipientClass::Bureau => {
                let info = self.bureaus.info(dispute.bureau);
                (info.name.to_string(), info.dispute_address.to_string())
            }
            RecipientClass::Furnisher => (
                dispute.furnisher_name.clone(),
                dispute.furnisher_address.clone(),
            ),
        };

        if let Some(enhancer) = &self.enhancer {
            let context = EnhancementContext {
                dispute_type: dispute.dispute_type,
                kind,
                bureau: dispute.bureau,
            };
            match enhancer.enhance(&body, &context) {
                Ok(enhanced)
                    if enhanced.len() as f32
                        >= body.len() as f32 * self.min_enhancement_ratio =>
                {
                    body = enhanced;
                }
                Ok(_) => {
                    warn!(
                        dispute = %dispute.id,
                        kind = kind.label(),
                        "enhanced letter implausibly short, keeping template text"
                    );
                }
                Err(error) => {
                    warn!(
                        dispute = %dispute.id,
                        kind = kind.label(),
                        %error,
                        "letter enhancement failed, keeping template text"
                    );
                }
            }
        }

        Ok(ComposedLetter {
            kind,
            subject: template.subject.to_string(),
            body,
            recipient,
            recipient_address,
            cited_section: template.cited_section,
        })
    }

    fn bindings(&self, dispute: &Dispute, today: NaiveDate) -> BTreeMap<&'static str, String> {
        let bureau = self.bureaus.info(dispute.bureau);

        let original_dispute_date = dispute
            .letters
            .iter()
            .filter_map(|letter| letter.sent_on)
            .min()
            .unwrap_or(today);
        let days_since_dispute = (today - original_dispute_date).num_days().max(0);

        let account_number = if dispute.account_number.trim().is_empty() {
            "Not provided".to_string()
        } else {
            dispute.account_number.clone()
        };

        let violation_summary = if dispute.violations.is_empty() {
            format!("- {}", dispute.dispute_reason)
        } else {
            dispute
                .violations
                .iter()
                .map(|violation| format!("- {}", violation.description))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let mut bindings = BTreeMap::new();
        bindings.insert("date", today.format("%B %d, %Y").to_string());
        bindings.insert("consumer_name", dispute.client_name.clone());
        bindings.insert("consumer_address", dispute.client_address.clone());
        bindings.insert("last_four_ssn", dispute.ssn_last_four.clone());
        bindings.insert("bureau_name", bureau.name.to_string());
        bindings.insert("bureau_address", bureau.dispute_address.to_string());
        bindings.insert("account_name", dispute.furnisher_name.clone());
        bindings.insert("account_number", account_number);
        bindings.insert("dispute_reason", dispute.dispute_reason.clone());
        bindings.insert("furnisher_name", dispute.furnisher_name.clone());
        bindings.insert("furnisher_address", dispute.furnisher_address.clone());
        bindings.insert("violation_summary", violation_summary);
        bindings.insert(
            "original_dispute_date",
            original_dispute_date.format("%B %d, %Y").to_string(),
        );
        bindings.insert("days_since_dispute", days_since_dispute.to_string());
        bindings
    }
}

impl std::fmt::Debug for LetterComposer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LetterComposer")
            .field("templates", &self.templates.templates().len())
            .field("enhancer", &self.enhancer.is_some())
            .field("min_enhancement_ratio", &self.min_enhancement_ratio)
            .finish()
    }
}

/// Replace every declared token; a token with no non-empty binding value
/// rejects the composition.
fn substitute(
    body: &str,
    tokens: &'static [&'static str],
    bindings: &BTreeMap<&'static str, String>,
) -> Result<String, ComposeError> {
    let mut output = body.to_string();

    for &token in tokens {
        let value = bindings
            .get(token)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ComposeError::UnresolvedToken { token })?;
        output = output.replace(&format!("{{{token}}}"), value);
    }

    if let Some(&token) = tokens
        .iter()
        .find(|token| output.contains(&format!("{{{token}}}")))
    {
        return Err(ComposeError::UnresolvedToken { token });
    }

    Ok(output)
}
