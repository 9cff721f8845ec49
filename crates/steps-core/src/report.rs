//! CSV report of engagement steps.
//!
//! Fields are joined with bare commas, one row per step, matching the
//! layout downstream spreadsheets already consume. Values are not quoted,
//! and a label the API leaves null is written as `None`.

use crate::client::StudioApi;
use crate::error::Result;
use crate::records::{Engagement, Flow, Step};
use crate::window::TimeWindow;
use chrono::{DateTime, Utc};
use std::io::Write;

pub const HEADER: &str = "Date/Time,Engagement SID,Contact Address,Step,Event,Next Step";

/// Counts gathered while writing a report.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub engagements_seen: usize,
    pub engagements_matched: usize,
    pub rows: usize,
}

/// `2023-06-01 10:00:00+00:00`
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%:z").to_string()
}

const MISSING: &str = "None";

pub fn format_row(engagement: &Engagement, step: &Step) -> String {
    [
        format_timestamp(&step.date_created).as_str(),
        engagement.sid.as_str(),
        engagement.contact_channel_address.as_deref().unwrap_or(MISSING),
        step.transitioned_from.as_deref().unwrap_or(MISSING),
        step.name.as_deref().unwrap_or(MISSING),
        step.transitioned_to.as_deref().unwrap_or(MISSING),
    ]
    .join(",")
}

pub struct CsvReport<W: Write> {
    out: W,
    rows: usize,
}

impl<W: Write> CsvReport<W> {
    /// Wrap `out` and write the header row.
    pub fn start(mut out: W) -> Result<Self> {
        writeln!(out, "{HEADER}")?;
        Ok(Self { out, rows: 0 })
    }

    pub fn write_step(&mut self, engagement: &Engagement, step: &Step) -> Result<()> {
        writeln!(self.out, "{}", format_row(engagement, step))?;
        self.rows += 1;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the sink.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Fetch `flow_sid`, then open the sink and write every step of every
/// engagement created inside `window`.
///
/// `open` is only called once the flow lookup has succeeded, so a bad flow
/// never creates or truncates an output file.
pub fn run<A, W, F>(api: &A, flow_sid: &str, window: &TimeWindow, open: F) -> Result<ReportSummary>
where
    A: StudioApi + ?Sized,
    W: Write,
    F: FnOnce() -> Result<W>,
{
    let flow = api.fetch_flow(flow_sid)?;
    tracing::info!(
        flow = %flow.sid,
        name = flow.friendly_name.as_deref().unwrap_or(""),
        "flow resolved"
    );
    let out = open()?;
    let (summary, _) = write_report(api, &flow, window, out)?;
    Ok(summary)
}

/// Stream `flow`'s engagements through `window` into `out`, in the order the
/// API yields them.
pub fn write_report<A, W>(
    api: &A,
    flow: &Flow,
    window: &TimeWindow,
    out: W,
) -> Result<(ReportSummary, W)>
where
    A: StudioApi + ?Sized,
    W: Write,
{
    let mut report = CsvReport::start(out)?;
    let mut summary = ReportSummary::default();

    for engagement in api.engagements(&flow.sid) {
        let engagement = engagement?;
        summary.engagements_seen += 1;
        if !window.contains(&engagement.date_created) {
            tracing::debug!(engagement = %engagement.sid, created = %engagement.date_created, "outside window");
            continue;
        }
        summary.engagements_matched += 1;
        for step in api.steps(&flow.sid, &engagement.sid) {
            report.write_step(&engagement, &step?)?;
        }
    }

    summary.rows = report.rows();
    let out = report.finish()?;
    tracing::info!(
        seen = summary.engagements_seen,
        matched = summary.engagements_matched,
        rows = summary.rows,
        "report written"
    );
    Ok((summary, out))
}
