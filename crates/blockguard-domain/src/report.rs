use blockguard_types::{BlockguardData, Finding, Verdict};

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub data: BlockguardData,
}
