use motofleet_core::config::AppConfig;
use motofleet_core::pricing::store::PriceListStore;
use motofleet_db::{connect_with_config, SqlPricingStore};
use serde::Serialize;

use crate::commands::{load_config, CommandResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match load_config("doctor") {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_pricing_policy(&config));
            checks.push(check_database(&config));
        }
        Err(failure) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: config_failure_detail(&failure.output),
            });
            for name in ["pricing_policy", "catalog_database"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn config_failure_detail(output: &str) -> String {
    serde_json::from_str::<serde_json::Value>(output)
        .ok()
        .and_then(|payload| payload["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| output.to_string())
}

fn check_pricing_policy(config: &AppConfig) -> DoctorCheck {
    let policy = &config.pricing;
    DoctorCheck {
        name: "pricing_policy",
        status: CheckStatus::Pass,
        details: format!(
            "policy `{}`: default list `{}`, margin floor {}, target {}",
            policy.version,
            policy.default_list_code,
            policy.default_margin_floor,
            policy.default_margin_target
        ),
    }
}

/// Connects and confirms the configured default list exists in the catalog.
fn check_database(config: &AppConfig) -> DoctorCheck {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck {
                name: "catalog_database",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            };
        }
    };

    let result = runtime.block_on(async {
        let pool = connect_with_config(&config.database)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))?;

        let default_list = SqlPricingStore::new(pool.clone())
            .find_list_by_code(&config.pricing.default_list_code)
            .await;
        pool.close().await;

        match default_list {
            Ok(Some(_)) => Ok(format!(
                "connected using `{}`; default list `{}` present",
                config.database.url, config.pricing.default_list_code
            )),
            Ok(None) => Err(format!(
                "default list `{}` is missing; every resolution without a list would fail",
                config.pricing.default_list_code
            )),
            Err(error) => Err(format!("catalog query failed (run `motofleet migrate`?): {error}")),
        }
    });

    let (status, details) = match result {
        Ok(details) => (CheckStatus::Pass, details),
        Err(details) => (CheckStatus::Fail, details),
    };
    DoctorCheck { name: "catalog_database", status, details }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{config_failure_detail, render_human, CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn human_rendering_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck {
                    name: "config_validation",
                    status: CheckStatus::Pass,
                    details: "ok".to_string(),
                },
                DoctorCheck {
                    name: "catalog_database",
                    status: CheckStatus::Skipped,
                    details: "skipped".to_string(),
                },
            ],
        };

        let rendered = render_human(&report);

        assert!(rendered.contains("- [ok] config_validation: ok"));
        assert!(rendered.contains("- [skip] catalog_database: skipped"));
    }

    #[test]
    fn config_failure_detail_unwraps_outcome_message() {
        let output = r#"{"command":"doctor","status":"error","error_class":"config_validation","message":"configuration issue: bad port"}"#;

        assert_eq!(config_failure_detail(output), "configuration issue: bad port");
    }
}
