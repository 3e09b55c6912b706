use boundary_gate::error::AppError;
use boundary_gate::policy::{ActionRequest, Decision, Evaluator, RuleSet, RuleSource, RuleStore};
use clap::Args;
use std::path::PathBuf;

const DEMO_SCENARIOS: &[(&str, &str)] = &[
    ("authorize lethal force at the depot gate", "logistics"),
    ("reroute aid for political advantage", "logistics"),
    ("approve a sole source award for generators", "procurement"),
    ("route shipment through active frontline", "logistics"),
    ("negotiate land acquisition for the clinic site", "reconstruction"),
    ("propose a reconstruction project ranking", "reconstruction"),
];

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Context the action is proposed in
    #[arg(long)]
    pub(crate) context: String,
    /// Free-text description of the proposed action
    pub(crate) action: String,
    /// Rule document to evaluate against (defaults to the bundled rules)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
    /// Print the decision as JSON instead of a summary
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ValidateArgs {
    /// Path to the rule document
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Rule document to walk through (defaults to the bundled rules)
    #[arg(long)]
    pub(crate) rules: Option<PathBuf>,
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let evaluator = open_evaluator(args.rules)?;
    let request = ActionRequest::new(args.action, args.context);
    let decision = evaluator.evaluate(&request)?;

    if args.json {
        match serde_json::to_string_pretty(&decision) {
            Ok(json) => println!("{}", json),
            Err(err) => println!("Decision payload unavailable: {}", err),
        }
    } else {
        print_decision(&request, &decision);
    }
    Ok(())
}

pub(crate) fn run_validate(args: ValidateArgs) -> Result<(), AppError> {
    let rules = RuleSet::from_path(&args.path)?;
    println!("{} is valid", args.path.display());
    print_summary(&rules);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let evaluator = open_evaluator(args.rules)?;

    println!("Boundary evaluation demo");
    print_summary(evaluator.rules());

    for (action, context_id) in DEMO_SCENARIOS {
        let request = ActionRequest::new(*action, *context_id);
        println!();
        match evaluator.evaluate(&request) {
            Ok(decision) => print_decision(&request, &decision),
            Err(err) => {
                println!("[{}] {}", context_id, action);
                println!("  Evaluation unavailable: {}", err);
            }
        }
    }
    Ok(())
}

fn open_evaluator(rules: Option<PathBuf>) -> Result<Evaluator, AppError> {
    let store = RuleStore::open(RuleSource::from_optional_path(rules))?;
    Ok(store.evaluator())
}

fn print_summary(rules: &RuleSet) {
    println!("  Rule set version: {}", rules.version());
    println!(
        "  Contexts: {}",
        rules
            .contexts()
            .iter()
            .map(|context| context.id.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "  Mandatory refusals: {} | Global restrictions: {} | Escalation triggers: {}",
        rules.mandatory_refusals().len(),
        rules.global_non_permitted_actions().len(),
        rules.escalation_triggers().len()
    );
    println!(
        "  Authority chain: {}",
        rules
            .authority_chain()
            .levels()
            .iter()
            .map(|level| level.level.as_str())
            .collect::<Vec<_>>()
            .join(" < ")
    );
}

fn print_decision(request: &ActionRequest, decision: &Decision) {
    println!("[{}] {}", request.context_id, request.action);
    println!("  Decision: {}", decision.status.label());
    println!("  Reason: {}", decision.reason);
    println!("  Rule: {}", decision.rule_reference.as_str());
    println!("  Level: {}", decision.level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use boundary_gate::policy::DecisionStatus;

    #[test]
    fn demo_scenarios_reference_bundled_contexts() {
        let evaluator = open_evaluator(None).expect("bundled rules");
        for (_, context_id) in DEMO_SCENARIOS {
            assert!(evaluator.rules().context(context_id).is_some());
        }
    }

    #[test]
    fn demo_scenarios_cover_every_decision_status() {
        let evaluator = open_evaluator(None).expect("bundled rules");
        let statuses: Vec<_> = DEMO_SCENARIOS
            .iter()
            .map(|(action, context_id)| {
                evaluator
                    .evaluate(&ActionRequest::new(*action, *context_id))
                    .expect("evaluates")
                    .status
            })
            .collect();

        assert!(statuses.contains(&DecisionStatus::Inadmissible));
        assert!(statuses.contains(&DecisionStatus::EscalationRequired));
        assert!(statuses.contains(&DecisionStatus::Admissible));
    }

    #[test]
    fn evaluate_rejects_unknown_context() {
        let result = run_evaluate(EvaluateArgs {
            context: "air_operations".to_string(),
            action: "schedule an airlift".to_string(),
            rules: None,
            json: false,
        });
        assert!(matches!(result, Err(AppError::Policy(_))));
    }

    #[test]
    fn validate_reports_missing_files() {
        let result = run_validate(ValidateArgs {
            path: PathBuf::from("does/not/exist.json"),
        });
        assert!(matches!(result, Err(AppError::Policy(_))));
    }
}
