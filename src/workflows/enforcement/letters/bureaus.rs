use super::super::domain::Bureau;

/// Mailing details for one consumer reporting agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BureauInfo {
    pub bureau: Bureau,
    pub name: &'static str,
    pub mailing_address: &'static str,
    pub dispute_address: &'static str,
}

/// Immutable directory of bureau mailing addresses, loaded once and passed
/// into the composer.
#[derive(Debug, Clone)]
pub struct BureauDirectory {
    entries: Vec<BureauInfo>,
}

impl BureauDirectory {
    pub fn standard() -> Self {
        Self {
            entries: vec![
                BureauInfo {
                    bureau: Bureau::Equifax,
                    name: "Equifax",
                    mailing_address: "Equifax Information Services LLC\nP.O. Box 740256\nAtlanta, GA 30374",
                    dispute_address: "Equifax Information Services LLC\nDispute Department\nP.O. Box 740256\nAtlanta, GA 30374",
                },
                BureauInfo {
                    bureau: Bureau::Experian,
                    name: "Experian",
                    mailing_address: "Experian\nP.O. Box 4500\nAllen, TX 75013",
                    dispute_address: "Experian\nDispute Department\nP.O. Box 4500\nAllen, TX 75013",
                },
                BureauInfo {
                    bureau: Bureau::TransUnion,
                    name: "TransUnion",
                    mailing_address: "TransUnion LLC\nConsumer Dispute Center\nP.O. Box 2000\nChester, PA 19016",
                    dispute_address: "TransUnion LLC\nConsumer Dispute Center\nP.O. Box 2000\nChester, PA 19016",
                },
            ],
        }
    }

    pub fn info(&self, bureau: Bureau) -> &BureauInfo {
        self.entries
            .iter()
            .find(|entry| entry.bureau == bureau)
            .expect("directory covers every bureau")
    }

    pub fn entries(&self) -> &[BureauInfo] {
        &self.entries
    }
}
