use crate::support::{
    comma_list, load_policy_or_exit, read_json_file_or_exit, render_json_or_exit, yes_no,
};
use serde_json::{Value, json};
use syncgate_kernel::{Document, MemoryHost, Principal, RequirementCheck, SyncError, SyncOutcome};

pub struct Args {
    pub policy: String,
    pub new: String,
    pub old: Option<String>,
    pub principal: String,
    pub json: bool,
}

pub fn run(args: Args) {
    let policy = load_policy_or_exit(&args.policy);
    let new: Document = read_json_file_or_exit(&args.new, "new revision");
    let old: Option<Document> = args
        .old
        .as_deref()
        .map(|path| read_json_file_or_exit(path, "old revision"));
    let principal: Principal = read_json_file_or_exit(&args.principal, "principal");

    let mut host = MemoryHost::new(principal);
    let result = policy.sync(&mut host, &new, old.as_ref());
    let accepted = result.is_ok();

    if args.json {
        let payload = match &result {
            Ok(outcome) => json!({
                "accepted": true,
                "outcome": outcome,
            }),
            Err(err) => rejection_json(err),
        };
        println!("{}", render_json_or_exit(&payload, "check"));
    } else {
        println!("syncgate check");
        println!("  Document: {}", new.id);
        println!("  Principal: {}", principal_label(host.principal()));
        println!("  Accepted: {}", yes_no(accepted));
        match &result {
            Ok(outcome) => print_outcome(outcome),
            Err(err) => println!("  Reason: {err}"),
        }
    }

    if !accepted {
        std::process::exit(1);
    }
}

fn rejection_json(err: &SyncError) -> Value {
    let mut payload = json!({
        "accepted": false,
        "kind": err.kind(),
        "message": err.to_string(),
    });
    if let SyncError::Forbidden { gate, .. } = err {
        payload["gate"] = json!(gate);
    }
    payload
}

fn principal_label(principal: &Principal) -> String {
    let name = if principal.name.is_empty() {
        "(anonymous)"
    } else {
        principal.name.as_str()
    };
    if principal.admin {
        format!("{name} [admin]")
    } else {
        name.to_string()
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    let authorization = &outcome.authorization;
    println!("  Operation: {}", authorization.operation);
    println!("  Type: {}", authorization.doc_type);
    println!("  Checks:");
    for check in &authorization.checks {
        println!("    - {}", describe_check(check));
    }
    if !outcome.emission.grants.is_empty() {
        println!("  Grants:");
        for grant in &outcome.emission.grants {
            println!("    - {} -> {}", grant.principal, grant.channel);
        }
    }
    println!(
        "  Channels: {}",
        comma_list(outcome.emission.channels.iter().map(String::as_str))
    );
}

fn describe_check(check: &RequirementCheck) -> String {
    match check {
        RequirementCheck::DefaultDeny => "no requirement registered; administrator".to_string(),
        RequirementCheck::Passed {
            index,
            triggered_by: Some(field),
        } => format!("requirement {index} passed (`{field}` changed)"),
        RequirementCheck::Passed {
            index,
            triggered_by: None,
        } => format!("requirement {index} passed"),
        RequirementCheck::Skipped { index } => format!("requirement {index} skipped"),
    }
}
