use std::{sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use client_core::{
    ControllerConfig, FormModel, FormUiState, HttpOrderTransport, MissingOrderTransport,
    OrderSubmissionController, OrderTransport,
};
use shared::validation::OrderFields;
use tracing::info;

/// Fills the order form from the command line and submits it once.
#[derive(Parser, Debug)]
struct Args {
    /// Backend base URL. Without it the form behaves as if the page had no
    /// network transport.
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, default_value = "")]
    name: String,
    #[arg(long, default_value = "")]
    telegram: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value_t = 5)]
    reset_delay_secs: u64,
    /// Stay until the result panel resets and print the form again.
    #[arg(long)]
    wait_reset: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let transport: Arc<dyn OrderTransport> = match &args.server_url {
        Some(url) => {
            let http = HttpOrderTransport::new(url)?;
            info!(endpoint = %http.endpoint(), "submitting to backend");
            Arc::new(http)
        }
        None => Arc::new(MissingOrderTransport),
    };

    let reset_delay = Duration::from_secs(args.reset_delay_secs);
    let controller = OrderSubmissionController::new(
        transport,
        ControllerConfig {
            reset_delay,
            ..ControllerConfig::default()
        },
    );
    controller.fill(OrderFields::new(args.name, args.telegram, args.city));

    let state = controller.submit().await;
    println!("state: {}", state.name());
    print_form(&controller.form());

    if args.wait_reset && !matches!(state, FormUiState::Idle) {
        tokio::time::sleep(reset_delay + Duration::from_millis(50)).await;
        println!("state after reset: {}", controller.state().name());
        print_form(&controller.form());
    }

    Ok(())
}

fn print_form(form: &FormModel) {
    if form.success_visible {
        println!("[success] order sent");
    }
    if form.error_visible {
        println!("[error] {}", form.error_text);
    }
    if form.form_visible {
        println!(
            "form: name={:?} telegram={:?} city={:?} button={:?} enabled={}",
            form.fields.name,
            form.fields.telegram,
            form.fields.city,
            form.submit_label,
            form.submit_enabled
        );
    }
}
