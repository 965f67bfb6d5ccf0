use crate::client::connection::ConnectionState;
use jiff::Zoned;
use serde_json::Value;

///Everything shown above and inside a block of results.
#[derive(Debug, Clone, Copy)]
pub struct ResultView<'a> {
    pub description: &'a str,
    pub endpoint: &'a str,
    pub filter: Option<&'a str>,
    pub total: u64,
    pub data: &'a Value,
}

pub fn render_result(view: &ResultView<'_>, at: &Zoned) -> String {
    let mut lines = vec![
        format!("Query: {}", view.description),
        format!("Endpoint: {}", view.endpoint),
    ];
    if let Some(filter) = view.filter {
        lines.push(format!("Filter: {filter}"));
    }
    lines.push(format!("Results: {}", view.total));
    lines.push(format!("At: {}", at.strftime("%Y-%m-%d %H:%M:%S")));
    lines.push("=".repeat(50));
    lines.push(String::new());

    match view.data {
        Value::Array(items) if !items.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                lines.push(format!("Student {}:", index + 1));
                lines.push(format!("{item:#}"));
                lines.push("-".repeat(30));
                lines.push(String::new());
            }
        }
        Value::Object(_) => lines.push(format!("{:#}", view.data)),
        _ => lines.push("No results found".to_string()),
    }

    let mut text = lines.join("\n");
    text.push('\n');
    text
}

///Shown when the server can't be reached at all.
pub fn render_connection_help(message: &str, server: &str) -> String {
    format!(
        "ERROR\n\n{message}\n\nCheck that:\n\
         - the records server is running at {server}\n\
         - the server's database is up and reachable from it\n\
         - there are no network problems between here and there\n\n\
         To start the server:\n\
         cargo run --bin roster\n\n\
         Without a database:\n\
         ROSTER_STORE=memory cargo run --bin roster"
    )
}

pub fn render_cleared(state: ConnectionState) -> String {
    let connection = match state {
        ConnectionState::Connected => "connected",
        ConnectionState::Connecting | ConnectionState::Disconnected => "disconnected",
    };
    format!(
        "Student records\n\n\
         Result area cleared.\n\n\
         - use `add` to insert a student\n\
         - use `mode` and `run` to query the data\n\
         - use `reload` to see every student\n\n\
         Connection: {connection}"
    )
}
