// Copyright 2025 Fernando Borretti
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

use std::io::stdin;
use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::clock::SystemClock;
use crate::cmd::card::add_card;
use crate::cmd::card::delete_card;
use crate::cmd::card::edit_card;
use crate::cmd::card::list_cards;
use crate::cmd::card::print_cards;
use crate::cmd::deck::add_deck;
use crate::cmd::deck::delete_deck;
use crate::cmd::deck::list_decks;
use crate::cmd::deck::print_decks;
use crate::cmd::due::print_due;
use crate::cmd::export::export_collection;
use crate::cmd::idea::add_idea;
use crate::cmd::idea::print_ideas;
use crate::cmd::import::import_decks;
use crate::cmd::stats::StatsFormat;
use crate::cmd::stats::print_stats;
use crate::cmd::study::plan_session;
use crate::cmd::study::run_session;
use crate::collection::Collection;
use crate::error::Fallible;
use crate::types::energy::EnergyLevel;
use crate::types::id::CardId;
use crate::types::id::DeckId;
use crate::types::idea::EmotionalState;
use crate::types::idea::Priority;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Manage decks.
    Deck {
        #[command(subcommand)]
        command: DeckCommand,
    },
    /// Manage flashcards.
    Card {
        #[command(subcommand)]
        command: CardCommand,
    },
    /// List the cards due now.
    Due {
        /// Path to the collection directory.
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// Show what a session would look like at the given energy level.
    Plan {
        #[arg(long = "dir")]
        directory: Option<String>,
        #[arg(long, value_enum, default_value_t = EnergyLevel::Normal)]
        energy: EnergyLevel,
    },
    /// Study in the terminal.
    Study {
        #[arg(long = "dir")]
        directory: Option<String>,
        #[arg(long, value_enum, default_value_t = EnergyLevel::Normal)]
        energy: EnergyLevel,
    },
    /// Print collection statistics.
    Stats {
        #[arg(long = "dir")]
        directory: Option<String>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = StatsFormat::Text)]
        format: StatsFormat,
    },
    /// Capture and list ideas.
    Idea {
        #[command(subcommand)]
        command: IdeaCommand,
    },
    /// Export the collection as JSON.
    Export {
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// Import TOML deck files from a directory.
    Import {
        /// Directory to search for `*.toml` deck files.
        source: String,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
}

#[derive(Subcommand)]
enum DeckCommand {
    /// Create a deck.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Display color, e.g. `#61DAFB`.
        #[arg(long)]
        color: Option<String>,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// List decks with card counts.
    List {
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// Delete a deck and all of its cards.
    Delete {
        id: String,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Add a card to a deck.
    Add {
        deck: String,
        front: String,
        back: String,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// List cards, optionally restricted to one deck.
    List {
        #[arg(long)]
        deck: Option<String>,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// Change a card's text.
    Edit {
        id: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// Delete a card.
    Delete {
        id: String,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
}

#[derive(Subcommand)]
enum IdeaCommand {
    /// Capture an idea.
    Add {
        title: String,
        #[arg(long, value_enum, default_value_t = EmotionalState::Inspired)]
        state: EmotionalState,
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
        /// A point of the vision. Repeatable.
        #[arg(long = "point")]
        points: Vec<String>,
        /// A tag. Repeatable.
        #[arg(long = "tag")]
        tags: Vec<String>,
        #[arg(long = "dir")]
        directory: Option<String>,
    },
    /// List ideas, newest first.
    List {
        #[arg(long = "dir")]
        directory: Option<String>,
    },
}

pub fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    let clock = SystemClock;
    match cli {
        Command::Deck { command } => match command {
            DeckCommand::Add {
                name,
                description,
                color,
                directory,
            } => {
                let coll = Collection::new(directory)?;
                let deck = add_deck(&coll, &clock, &name, description, color)?;
                println!("{}", deck.id);
                Ok(())
            }
            DeckCommand::List { directory } => {
                let coll = Collection::new(directory)?;
                print_decks(&list_decks(&coll, &clock)?);
                Ok(())
            }
            DeckCommand::Delete { id, directory } => {
                let coll = Collection::new(directory)?;
                delete_deck(&coll, &DeckId::from(id))
            }
        },
        Command::Card { command } => match command {
            CardCommand::Add {
                deck,
                front,
                back,
                directory,
            } => {
                let coll = Collection::new(directory)?;
                let card = add_card(&coll, &clock, &DeckId::from(deck), &front, &back)?;
                println!("{}", card.id);
                Ok(())
            }
            CardCommand::List { deck, directory } => {
                let coll = Collection::new(directory)?;
                let deck = deck.map(DeckId::from);
                print_cards(&list_cards(&coll, deck.as_ref())?);
                Ok(())
            }
            CardCommand::Edit {
                id,
                front,
                back,
                directory,
            } => {
                let coll = Collection::new(directory)?;
                edit_card(&coll, &clock, &CardId::from(id), front, back)?;
                Ok(())
            }
            CardCommand::Delete { id, directory } => {
                let coll = Collection::new(directory)?;
                delete_card(&coll, &CardId::from(id))
            }
        },
        Command::Due { directory } => {
            let coll = Collection::new(directory)?;
            print_due(&coll, &clock)
        }
        Command::Plan { directory, energy } => {
            let coll = Collection::new(directory)?;
            let plan = plan_session(&coll, &clock, energy)?;
            println!("{} ({} mode, {} cards)", plan.message, plan.mode, plan.count);
            Ok(())
        }
        Command::Study { directory, energy } => {
            let coll = Collection::new(directory)?;
            let mut input = stdin().lock();
            let mut output = stdout().lock();
            run_session(&coll, &clock, energy, &mut input, &mut output)?;
            Ok(())
        }
        Command::Stats { directory, format } => {
            let coll = Collection::new(directory)?;
            print_stats(&coll, &clock, format)
        }
        Command::Idea { command } => match command {
            IdeaCommand::Add {
                title,
                state,
                priority,
                points,
                tags,
                directory,
            } => {
                let coll = Collection::new(directory)?;
                let idea = add_idea(&coll, &clock, &title, state, points, priority, tags)?;
                println!("{}", idea.id);
                Ok(())
            }
            IdeaCommand::List { directory } => {
                let coll = Collection::new(directory)?;
                print_ideas(&coll)
            }
        },
        Command::Export { directory } => export_collection(directory),
        Command::Import { source, directory } => {
            let coll = Collection::new(directory)?;
            let summary = import_decks(&coll, &clock, &PathBuf::from(source))?;
            println!("Imported {} decks, {} cards.", summary.decks, summary.cards);
            Ok(())
        }
    }
}
