use crate::support::render_json_or_exit;
use std::fs;
use syncgate_kernel::Operation;

pub fn run(acl: String, out: Option<String>) {
    let policy = syncgate_acl::compile_path(&acl).unwrap_or_else(|err| {
        eprintln!("error: {err}");
        std::process::exit(2);
    });
    let rendered = render_json_or_exit(&policy, "compile");

    let Some(out) = out else {
        println!("{rendered}");
        return;
    };

    fs::write(&out, format!("{rendered}\n")).unwrap_or_else(|err| {
        eprintln!("error: failed to write policy to {out}: {err}");
        std::process::exit(2);
    });

    let registry = policy.registry();
    println!("syncgate compile");
    println!("  ACL: {acl}");
    println!("  Policy: {out}");
    println!("  Document types: {}", registry.document_types().len());
    for operation in Operation::ALL {
        println!(
            "  {} requirements: {}",
            operation,
            registry.requirement_count(operation)
        );
    }
}
