use super::config::AdvisorConfig;
use crate::core::models::qc::{ActionKind, QcVerdict, ResubmissionAction, ResubmissionPlan};

const JOB_PLACEHOLDER: &str = "<JOB>";

/// Turns an insufficient QC verdict into suggested remediation steps.
///
/// The advisor only writes suggestions; it never submits anything.
#[derive(Debug, Clone, Default)]
pub struct ResubmissionAdvisor {
    config: AdvisorConfig,
}

impl ResubmissionAdvisor {
    pub fn new(config: AdvisorConfig) -> Self {
        Self { config }
    }

    /// Returns a plan when `verdict` is insufficient, `None` otherwise.
    pub fn advise(&self, verdict: &QcVerdict, job_name: Option<&str>) -> Option<ResubmissionPlan> {
        if verdict.sufficient {
            return None;
        }
        let shortfall = verdict.shortfall();
        let job = job_name.unwrap_or(JOB_PLACEHOLDER);
        let ext = &self.config.job_script_extension;
        let submit = &self.config.submit_command;
        let script = format!("{job}.{ext}");
        let resubmit_script = format!("{job}_resubmit.{ext}");

        let mut rerun_commands = Vec::new();
        if let Some(dir) = &self.config.working_dir {
            rerun_commands.push(format!("cd {}", dir.display()));
        }
        rerun_commands.push(format!("{submit} {script}"));

        let actions = vec![
            ResubmissionAction {
                kind: ActionKind::RerunWithMoreSeeds,
                description: format!(
                    "Re-run the same job script to generate additional seeds ({shortfall} more passing models needed):"
                ),
                commands: rerun_commands,
            },
            ResubmissionAction {
                kind: ActionKind::WidenSamplingArray,
                description: format!(
                    "Create a modified job script with a larger array or at least {shortfall} extra seeds and submit it:"
                ),
                commands: vec![
                    format!("cp {script} {resubmit_script}"),
                    format!("# edit {resubmit_script} to use a new job name, then: {submit} {resubmit_script}"),
                ],
            },
            ResubmissionAction {
                kind: ActionKind::AdjustMsaOrRecycling,
                description:
                    "If failures persist, enable the MSA server or increase recycling/sampling steps."
                        .to_string(),
                commands: Vec::new(),
            },
        ];

        Some(ResubmissionPlan {
            job_name: job_name.map(str::to_string),
            passing: verdict.passing_count(),
            required: verdict.thresholds.min_pass,
            shortfall,
            actions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::qc::{QcThresholds, ScoredRecord};
    use std::path::PathBuf;

    fn verdict(passing: usize, min_pass: usize) -> QcVerdict {
        QcVerdict {
            thresholds: QcThresholds {
                min_pass,
                ..QcThresholds::default()
            },
            total: passing,
            passing: (0..passing)
                .map(|i| ScoredRecord::unreadable(PathBuf::from(format!("p{i}"))))
                .collect(),
            failing: Vec::new(),
            sufficient: passing >= min_pass,
        }
    }

    #[test]
    fn sufficient_verdict_needs_no_plan() {
        assert_eq!(ResubmissionAdvisor::default().advise(&verdict(5, 5), None), None);
    }

    #[test]
    fn plan_reports_shortfall_and_ordered_actions() {
        let plan = ResubmissionAdvisor::default()
            .advise(&verdict(8, 10), Some("WT_trastuzumab"))
            .unwrap();

        assert_eq!(plan.shortfall, 2);
        assert_eq!(plan.passing, 8);
        assert_eq!(plan.required, 10);
        let kinds: Vec<_> = plan.actions.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::RerunWithMoreSeeds,
                ActionKind::WidenSamplingArray,
                ActionKind::AdjustMsaOrRecycling
            ]
        );
        assert_eq!(plan.actions[0].commands, vec!["bsub < WT_trastuzumab.lsf"]);
        assert_eq!(
            plan.actions[1].commands[0],
            "cp WT_trastuzumab.lsf WT_trastuzumab_resubmit.lsf"
        );
    }

    #[test]
    fn working_directory_and_placeholder_are_used() {
        let advisor = ResubmissionAdvisor::new(AdvisorConfig {
            working_dir: Some(PathBuf::from("/work/1216")),
            job_script_extension: "sbatch".to_string(),
            submit_command: "sbatch".to_string(),
        });

        let plan = advisor.advise(&verdict(0, 3), None).unwrap();

        assert_eq!(plan.job_name, None);
        assert_eq!(
            plan.actions[0].commands,
            vec!["cd /work/1216", "sbatch <JOB>.sbatch"]
        );
    }
}
