//! # Todo Storage Example
//!
//! Walks one todo list through the three storage schemas:
//!
//! 1. **Upgrade on read**: v1 bytes decoded straight into the v3 model
//! 2. **Downgrade on write**: v3 state written for a v1 client
//! 3. **Embedded version**: self-describing frames with a 2-byte header
//! 4. **Errors**: unknown, future and truncated inputs
//!
//! Run: `cargo run -p verchain-example-todos`

use std::process;

use verchain::{peek_version, Error};
use verchain_example_todos::schemas::{v1, v3};
use verchain_example_todos::{handler, TodoAppVersioned, LATEST_VERSION};

fn main() {
    println!("=== Todo Storage Example ===\n");

    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }

    println!("\n=== Done! ===");
}

fn run() -> Result<(), Error> {
    let app = demo_upgrade()?;
    demo_downgrade(app.clone())?;
    demo_embedded_version(app)?;
    demo_errors()
}

// ── Section 1: Upgrade on read ──────────────────────────────────────

fn demo_upgrade() -> Result<v3::App, Error> {
    println!("1. Reading v1 data as v{LATEST_VERSION}...\n");

    let old = v1::App {
        todos: vec![
            v1::Todo {
                id: 1,
                title: "Buy groceries".into(),
                done: false,
            },
            v1::Todo {
                id: 2,
                title: "Write report".into(),
                done: true,
            },
        ],
    };
    let bytes = postcard::to_allocvec(&old).map_err(Error::codec)?;
    println!("   v1 payload: {} bytes", bytes.len());

    let app = handler()?.deserialize(&bytes, 1)?;
    for todo in app.todos.values() {
        println!(
            "   #{} {:?} {:?} priority={:?}",
            todo.id, todo.detail.title, todo.status, todo.priority
        );
    }
    println!();
    Ok(app)
}

// ── Section 2: Downgrade on write ───────────────────────────────────

fn demo_downgrade(mut app: v3::App) -> Result<(), Error> {
    println!("2. Writing v{LATEST_VERSION} state for a v1 client...\n");

    if let Some(todo) = app.todos.get_mut(&1) {
        todo.status = v3::TodoStatus::Done;
        todo.priority = v3::Priority::High;
    }

    let h = handler()?;
    let bytes = h.serialize(app, 1)?;
    let old: v1::App = postcard::from_bytes(&bytes).map_err(Error::codec)?;
    for todo in &old.todos {
        println!("   #{} {:?} done={}", todo.id, todo.title, todo.done);
    }
    println!("   (priority has no v1 field and is dropped)\n");
    Ok(())
}

// ── Section 3: Embedded version ─────────────────────────────────────

fn demo_embedded_version(app: v3::App) -> Result<(), Error> {
    println!("3. Self-describing frames...\n");

    let h = handler()?;
    for version in 1..=LATEST_VERSION {
        let framed = h.serialize_with_embedded_version(app.clone(), version)?;
        println!(
            "   v{}: header {:02x?}, {} bytes total",
            peek_version(&framed)?,
            &framed[..2],
            framed.len()
        );
        let back = h.deserialize_with_embedded_version(&framed)?;
        println!("        read back {} todos", back.todos.len());
    }

    // A v2 value can be re-targeted without going through the latest model.
    let v2 = h.migrate(TodoAppVersioned::V3(app), 2)?;
    println!("   migrate(v3 -> 2) gives {:?}\n", matches!(v2, TodoAppVersioned::V2(_)));
    Ok(())
}

// ── Section 4: Errors ───────────────────────────────────────────────

fn demo_errors() -> Result<(), Error> {
    println!("4. Error reporting...\n");

    let h = handler()?;
    let cases: [(&str, Result<v3::App, Error>); 3] = [
        ("future version", h.deserialize(&[], 7)),
        ("truncated frame", h.deserialize_with_embedded_version(&[3])),
        ("malformed payload", h.deserialize(&[0xff, 0xff], 3)),
    ];
    for (label, result) in cases {
        match result {
            Ok(_) => println!("   {label}: unexpectedly decoded"),
            Err(e) => println!("   {label}: {e}"),
        }
    }
    Ok(())
}
