//! Sequential insert/select/update/delete check against the live tables.
//!
//! Every step issues one request and reports on its own line. A failed step
//! is printed and the run moves on, except for the first insert: without a
//! lead id nothing after it can run.

use std::future::Future;
use std::io::{self, Write};

use leadbase_db::{DbResult, SupabaseClient};

use crate::modules::{call_logs, leads, scraper_runs, TABLES};

const RULE_WIDTH: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InsertLead,
    SelectLead,
    UpdateLead,
    InsertCallLog,
    InsertScraperRun,
    DeleteLead,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::InsertLead,
        Step::SelectLead,
        Step::UpdateLead,
        Step::InsertCallLog,
        Step::InsertScraperRun,
        Step::DeleteLead,
    ];

    fn marker(self) -> &'static str {
        match self {
            Step::InsertLead => "1️⃣",
            Step::SelectLead => "2️⃣",
            Step::UpdateLead => "3️⃣",
            Step::InsertCallLog => "4️⃣",
            Step::InsertScraperRun => "5️⃣",
            Step::DeleteLead => "6️⃣",
        }
    }

    fn heading(self) -> &'static str {
        match self {
            Step::InsertLead => "Testing INSERT operation...",
            Step::SelectLead => "Testing SELECT operation...",
            Step::UpdateLead => "Testing UPDATE operation...",
            Step::InsertCallLog => "Testing call_logs table...",
            Step::InsertScraperRun => "Testing scraper_runs table...",
            Step::DeleteLead => "Testing DELETE operation (cleanup)...",
        }
    }

    /// Short name used in failure lines and logs.
    pub fn label(self) -> &'static str {
        match self {
            Step::InsertLead => "INSERT",
            Step::SelectLead => "SELECT",
            Step::UpdateLead => "UPDATE",
            Step::InsertCallLog => "Call log",
            Step::InsertScraperRun => "Scraper run",
            Step::DeleteLead => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub step: Step,
    /// Success detail, or the error message on failure.
    pub result: Result<String, String>,
}

impl StepOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

/// Per-step record of one run. Informational only.
#[derive(Debug, Clone, Default)]
pub struct SmokeReport {
    pub outcomes: Vec<StepOutcome>,
    /// Set when the run stopped before attempting every step.
    pub aborted: bool,
}

impl SmokeReport {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        !self.aborted && self.outcomes.len() == Step::ALL.len() && self.failed() == 0
    }

    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.outcomes.iter().find(|o| o.step == step)
    }
}

/// Records written by the run. Every run uses the same fixed values.
pub mod fixtures {
    use leadbase_db::RecordId;

    use crate::modules::{
        call_logs::NewCallLog,
        leads::{LeadPatch, NewLead},
        scraper_runs::{NewScraperRun, RunStatus},
    };

    pub fn lead() -> NewLead {
        NewLead {
            name: "Ryan Test".to_string(),
            phone: "+15559876543".to_string(),
            property_address: "456 Test Ave, Los Angeles, CA 90001".to_string(),
            lead_source: "Smoke Test".to_string(),
            data_enriched: false,
            in_foreclosure: true,
        }
    }

    pub fn lead_patch() -> LeadPatch {
        LeadPatch {
            data_enriched: Some(true),
            lender_name: Some("Test Bank".to_string()),
        }
    }

    pub fn call_log(lead_id: RecordId) -> NewCallLog {
        NewCallLog {
            lead_id,
            agent_name: "SaintSal".to_string(),
            call_type: "Test Call".to_string(),
            call_summary: "This is a test call log".to_string(),
            tags: vec!["test".to_string(), "automated".to_string()],
        }
    }

    pub fn scraper_run() -> NewScraperRun {
        NewScraperRun {
            leads_found: 10,
            leads_enriched: 8,
            leads_sent_to_ghl: 8,
            status: RunStatus::Success,
            errors: Vec::new(),
        }
    }
}

pub struct SmokeRunner<'a> {
    client: &'a SupabaseClient,
}

impl<'a> SmokeRunner<'a> {
    pub fn new(client: &'a SupabaseClient) -> Self {
        Self { client }
    }

    /// Run all steps in order, writing the console report to `out`.
    pub async fn run<W: Write>(&self, out: &mut W) -> io::Result<SmokeReport> {
        let client = self.client;
        let mut report = SmokeReport::default();

        tracing::info!(url = %client.project_url(), tables = ?TABLES, "starting smoke test");

        rule(out)?;
        writeln!(out, "🔍 TESTING SUPABASE CONNECTION")?;
        rule(out)?;

        let lead = attempt(
            out,
            &mut report,
            Step::InsertLead,
            leads::create(client, &fixtures::lead()),
            |lead| format!("Lead created: {}", lead.id),
        )
        .await?;
        let Some(lead) = lead else {
            report.aborted = true;
            tracing::warn!("lead insert failed; remaining steps skipped");
            return Ok(report);
        };
        let lead_id = lead.id;

        attempt(
            out,
            &mut report,
            Step::SelectLead,
            leads::find(client, &lead_id),
            |lead| format!("Found lead: {}", lead.name),
        )
        .await?;

        attempt(
            out,
            &mut report,
            Step::UpdateLead,
            leads::update(client, &lead_id, &fixtures::lead_patch()),
            |lead| format!("Lead updated: data_enriched = {}", lead.data_enriched),
        )
        .await?;

        attempt(
            out,
            &mut report,
            Step::InsertCallLog,
            call_logs::create(client, &fixtures::call_log(lead_id.clone())),
            |log| format!("Call log created: {}", log.id),
        )
        .await?;

        attempt(
            out,
            &mut report,
            Step::InsertScraperRun,
            scraper_runs::create(client, &fixtures::scraper_run()),
            |run| format!("Scraper run logged: {}", run.id),
        )
        .await?;

        attempt(
            out,
            &mut report,
            Step::DeleteLead,
            leads::delete(client, &lead_id),
            |_| "Test lead deleted".to_string(),
        )
        .await?;

        writeln!(out)?;
        rule(out)?;
        if report.all_passed() {
            writeln!(out, "🔥 DATABASE IS LIVE AND FULLY OPERATIONAL!")?;
        } else {
            writeln!(
                out,
                "⚠️  DATABASE REACHABLE, {} OF {} CHECKS FAILED",
                report.failed(),
                Step::ALL.len()
            )?;
        }
        rule(out)?;
        out.flush()?;

        Ok(report)
    }
}

async fn attempt<W, T, Fut, D>(
    out: &mut W,
    report: &mut SmokeReport,
    step: Step,
    call: Fut,
    describe: D,
) -> io::Result<Option<T>>
where
    W: Write,
    Fut: Future<Output = DbResult<T>>,
    D: FnOnce(&T) -> String,
{
    writeln!(out, "\n{} {}", step.marker(), step.heading())?;
    out.flush()?;

    match call.await {
        Ok(value) => {
            let detail = describe(&value);
            writeln!(out, "   ✅ {}", detail)?;
            tracing::info!(step = step.label(), "smoke step passed");
            report.outcomes.push(StepOutcome {
                step,
                result: Ok(detail),
            });
            Ok(Some(value))
        }
        Err(e) => {
            writeln!(out, "   ❌ {} failed: {}", step.label(), e)?;
            tracing::warn!(step = step.label(), error = %e, "smoke step failed");
            report.outcomes.push(StepOutcome {
                step,
                result: Err(e.to_string()),
            });
            Ok(None)
        }
    }
}

fn rule<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(RULE_WIDTH))
}
