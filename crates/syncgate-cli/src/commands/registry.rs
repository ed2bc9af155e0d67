use crate::support::{comma_list, load_policy_or_exit, render_json_or_exit};
use serde_json::{Map, Value, json};
use syncgate_kernel::{Lookup, Operation, RequirementRegistry, SyncPolicy};

pub fn run(policy_path: String, json_output: bool) {
    let policy = load_policy_or_exit(&policy_path);
    let registry = policy.registry();

    if json_output {
        let payload = json!({
            "policy": policy_path,
            "sequenceEquality": policy.sequence_equality(),
            "accessTypes": policy.access_types(),
            "requirementCounts": requirement_counts(registry),
            "types": type_rows(&policy),
        });
        println!("{}", render_json_or_exit(&payload, "registry"));
        return;
    }

    println!("syncgate registry");
    println!("  Policy: {policy_path}");
    println!(
        "  Access types: {}",
        comma_list(policy.access_types().iter().map(String::as_str))
    );
    for doc_type in registry.document_types() {
        let summary = Operation::ALL
            .iter()
            .map(|operation| {
                let count = registered(registry.lookup(*operation, doc_type));
                match count {
                    Some(count) => format!("{operation}={count}"),
                    None => format!("{operation}=admin"),
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("  {doc_type}: {summary}");
    }
    if registry.is_empty() {
        println!("  (no requirements; every write needs an administrator)");
    }
}

fn requirement_counts(registry: &RequirementRegistry) -> Value {
    let counts: Map<String, Value> = Operation::ALL
        .iter()
        .map(|operation| {
            (
                operation.as_str().to_string(),
                json!(registry.requirement_count(*operation)),
            )
        })
        .collect();
    Value::Object(counts)
}

fn type_rows(policy: &SyncPolicy) -> Value {
    let registry = policy.registry();
    let rows: Map<String, Value> = registry
        .document_types()
        .into_iter()
        .map(|doc_type| {
            let mut row = Map::new();
            for operation in Operation::ALL {
                row.insert(
                    operation.as_str().to_string(),
                    json!(registered(registry.lookup(operation, doc_type))),
                );
            }
            row.insert(
                "grantsAccess".to_string(),
                json!(policy.grants_access(doc_type)),
            );
            (doc_type.to_string(), Value::Object(row))
        })
        .collect();
    Value::Object(rows)
}

/// Requirements registered for one slot; `None` is default-deny.
fn registered(lookup: Lookup<'_>) -> Option<usize> {
    match lookup {
        Lookup::Single(_) => Some(1),
        Lookup::Ordered(requirements) => Some(requirements.len()),
        Lookup::Absent => None,
    }
}
