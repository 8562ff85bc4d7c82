// Copyright 2025 Memrelay Contributors (https://github.com/memrelay)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Memrelay CLI
//!
//! Demo commands against a hosted agent-memory service: provision
//! memories, append conversation events, and read back raw events or
//! derived records.

mod samples;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use memrelay_client::{
    facts_namespace, poll, provision, retry, ClientConfig, CreateEventOptions, EventMessage,
    MemoryClient, MemrelayError, PollConfig, RetrieveOptions, RetryPlan,
};
use rand::Rng;
use std::time::Duration;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "memrelay")]
#[command(about = "Memrelay - agent-memory service demos", long_about = None)]
struct Cli {
    /// Memory service endpoint
    #[arg(long, env = "MEMRELAY_ENDPOINT", default_value = "http://localhost:8080")]
    endpoint: String,

    /// Bearer token for the service
    #[arg(long, env = "MEMRELAY_API_KEY")]
    api_key: Option<String>,

    /// Actor scope for events and namespaces
    #[arg(long, default_value = "agent-actor")]
    actor: String,

    /// Session scope for events ("random" generates a fresh one)
    #[arg(long, default_value = "agent-session")]
    session: String,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackoffMode {
    Fixed,
    Exponential,
    Capped,
}

#[derive(Subcommand)]
enum Commands {
    /// Ensure a named memory exists and report its id
    Provision {
        /// Logical memory name
        name: String,

        /// Attach semantic + preference strategies (long-term preset)
        #[arg(long)]
        long_term: bool,

        /// Memory description
        #[arg(long)]
        description: Option<String>,

        /// Override event expiry in days
        #[arg(long)]
        expiry_days: Option<u32>,

        /// Skip waiting for the memory to become ACTIVE
        #[arg(long)]
        no_wait: bool,
    },

    /// Append one user/assistant exchange
    Record {
        /// Memory id
        memory_id: String,

        /// User message
        #[arg(long)]
        user: String,

        /// Assistant reply
        #[arg(long)]
        assistant: Option<String>,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// Write the bundled sample conversation
    Seed {
        /// Memory id
        memory_id: String,

        #[command(flatten)]
        retry: RetryArgs,
    },

    /// List raw events for the actor/session
    Events {
        /// Memory id
        memory_id: String,

        /// Cap the number of events returned
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show the last K conversation turns
    Turns {
        /// Memory id
        memory_id: String,

        /// Number of turns
        #[arg(short, default_value = "5")]
        k: usize,
    },

    /// Semantic query over derived records
    Retrieve {
        /// Memory id
        memory_id: String,

        /// Query text
        query: String,

        /// Namespace (defaults to /facts/<actor>)
        #[arg(long)]
        namespace: Option<String>,

        /// Maximum results
        #[arg(long, default_value = "5")]
        top_k: u32,

        /// Poll until results appear instead of querying once
        #[arg(long)]
        wait: bool,

        /// Poll interval in seconds (with --wait)
        #[arg(long, default_value = "5")]
        interval_secs: u64,

        /// Poll timeout in seconds (with --wait)
        #[arg(long, default_value = "120")]
        timeout_secs: u64,
    },

    /// List every derived record in a namespace
    Records {
        /// Memory id
        memory_id: String,

        /// Namespace (defaults to /facts/<actor>)
        #[arg(long)]
        namespace: Option<String>,
    },

    /// List all memories
    Memories,

    /// Show one memory's status
    Status {
        /// Memory id
        memory_id: String,
    },

    /// Delete a memory and everything in it
    Delete {
        /// Memory id
        memory_id: String,
    },
}

#[derive(clap::Args, Clone)]
struct RetryArgs {
    /// Maximum write attempts under throttling
    #[arg(long, default_value = "5")]
    max_attempts: u32,

    /// Backoff mode between throttled attempts
    #[arg(long, value_enum, default_value = "capped")]
    backoff: BackoffMode,

    /// Initial backoff delay in milliseconds
    #[arg(long, default_value = "1000")]
    delay_ms: u64,

    /// Backoff cap in milliseconds (capped mode)
    #[arg(long, default_value = "30000")]
    max_delay_ms: u64,
}

impl RetryArgs {
    fn plan(&self) -> RetryPlan {
        let initial = Duration::from_millis(self.delay_ms);
        match self.backoff {
            BackoffMode::Fixed => RetryPlan::fixed(self.max_attempts, initial),
            BackoffMode::Exponential => RetryPlan::exponential(self.max_attempts, initial),
            BackoffMode::Capped => RetryPlan::capped(
                self.max_attempts,
                initial,
                Duration::from_millis(self.max_delay_ms),
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = ClientConfig::new(cli.endpoint.clone());
    if let Some(api_key) = &cli.api_key {
        config = config.with_api_key(api_key.clone());
    }
    let client = MemoryClient::new(config);

    let session = if cli.session == "random" {
        let suffix: u32 = rand::thread_rng().gen_range(10_000..100_000);
        format!("session-{suffix}")
    } else {
        cli.session.clone()
    };

    match cli.command {
        Commands::Provision {
            name,
            long_term,
            description,
            expiry_days,
            no_wait,
        } => {
            let mut spec = if long_term {
                provision::long_term_spec(&name, &cli.actor)
            } else {
                provision::short_term_spec(&name)
            };
            if let Some(description) = description {
                spec = spec.with_description(description);
            }
            if let Some(days) = expiry_days {
                spec = spec.with_event_expiry_days(days);
            }

            if no_wait {
                let id = provision::get_or_create_memory(&client, &spec)
                    .await
                    .context("Failed to provision memory")?;
                println!("✓ Memory available: {id}");
            } else {
                let memory = provision::provision_and_wait(&client, &spec, &PollConfig::default())
                    .await
                    .context("Failed to provision memory")?;
                println!("✓ Memory active: {}", memory.id);
            }
        }

        Commands::Record {
            memory_id,
            user,
            assistant,
            retry: retry_args,
        } => {
            let plan = retry_args.plan();
            let mut messages = vec![EventMessage::user(user)];
            if let Some(reply) = assistant {
                messages.push(EventMessage::assistant(reply));
            }
            let opts = CreateEventOptions::new(&memory_id, &cli.actor, &session, messages);
            let event = retry::write_event_with_retry(&client, &opts, &plan)
                .await
                .context("Failed to append event")?;
            println!("✓ Event appended: {}", event.event_id);
        }

        Commands::Seed {
            memory_id,
            retry: retry_args,
        } => {
            let plan = retry_args.plan();
            let mut written = 0usize;
            for (user, assistant) in samples::SAMPLE_CONVERSATION {
                let opts = CreateEventOptions::new(
                    &memory_id,
                    &cli.actor,
                    &session,
                    vec![
                        EventMessage::user(*user),
                        EventMessage::assistant(*assistant),
                    ],
                );
                match retry::write_event_with_retry(&client, &opts, &plan).await {
                    Ok(event) => {
                        written += 1;
                        info!(event_id = %event.event_id, "exchange written");
                    }
                    Err(e) => {
                        // independent writes: report and keep going
                        eprintln!("✗ exchange failed: {e}");
                    }
                }
                // pace the service a little between writes
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            println!(
                "✓ Seeded {written}/{} exchanges into {memory_id} (actor {}, session {session})",
                samples::SAMPLE_CONVERSATION.len(),
                cli.actor
            );
        }

        Commands::Events { memory_id, limit } => {
            let events = client
                .list_events(&memory_id, &cli.actor, &session, limit)
                .await
                .context("Failed to list events")?;
            println!("{} event(s)", events.len());
            for event in &events {
                for message in &event.messages {
                    println!("  [{}] {:?}: {}", event.timestamp, message.role, message.text);
                }
            }
        }

        Commands::Turns { memory_id, k } => {
            let turns = client
                .last_k_turns(&memory_id, &cli.actor, &session, k)
                .await
                .context("Failed to fetch turns")?;
            println!("{} turn(s)", turns.len());
            for (i, turn) in turns.iter().enumerate() {
                println!("Turn {}:", i + 1);
                for message in &turn.messages {
                    println!("  {:?}: {}", message.role, message.text);
                }
            }
        }

        Commands::Retrieve {
            memory_id,
            query,
            namespace,
            top_k,
            wait,
            interval_secs,
            timeout_secs,
        } => {
            let namespace = namespace.unwrap_or_else(|| facts_namespace(&cli.actor));
            let opts = RetrieveOptions::new(&namespace, &query).with_top_k(top_k);

            let records = if wait {
                let poll_config = PollConfig::new(
                    Duration::from_secs(interval_secs),
                    Duration::from_secs(timeout_secs),
                );
                match poll::await_derived_records(&client, &memory_id, &opts, 1, &poll_config).await
                {
                    Ok(records) => records,
                    Err(MemrelayError::Timeout { waited }) => {
                        // derivation latency is not observable; "not yet" is a valid answer
                        println!("no derived records after {waited:?} - try again later");
                        return Ok(());
                    }
                    Err(e) => return Err(e).context("Failed to retrieve records"),
                }
            } else {
                client
                    .retrieve_memories(&memory_id, &opts)
                    .await
                    .context("Failed to retrieve records")?
            };

            println!("{} record(s) for '{query}' in {namespace}", records.len());
            for record in &records {
                match record.score {
                    Some(score) => println!("  [{score:.4}] {}", record.text()),
                    None => println!("  [   -  ] {}", record.text()),
                }
            }
        }

        Commands::Records {
            memory_id,
            namespace,
        } => {
            let namespace = namespace.unwrap_or_else(|| facts_namespace(&cli.actor));
            let records = client
                .list_memory_records(&memory_id, &namespace)
                .await
                .context("Failed to list records")?;
            println!("{} record(s) in {namespace}", records.len());
            for record in &records {
                println!("  {} {}", record.record_id, record.text());
            }
        }

        Commands::Memories => {
            let memories = client.list_memories().await.context("Failed to list memories")?;
            println!("{} memor(ies)", memories.len());
            for memory in &memories {
                println!("  {} {:?} ({})", memory.id, memory.status, memory.name);
            }
        }

        Commands::Status { memory_id } => {
            let memory = client
                .get_memory(&memory_id)
                .await
                .context("Failed to fetch memory")?;
            println!("{}: {:?}", memory.id, memory.status);
            if let Some(description) = &memory.description {
                println!("  {description}");
            }
            if let Some(days) = memory.event_expiry_days {
                println!("  events expire after {days} day(s)");
            }
        }

        Commands::Delete { memory_id } => {
            client
                .delete_memory(&memory_id)
                .await
                .context("Failed to delete memory")?;
            println!("✓ Deleted {memory_id}");
        }
    }

    Ok(())
}
