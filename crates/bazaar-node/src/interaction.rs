//! The interactive auction menu.

use bazaar_auction::{AuctionError, AuctionHouse, Notifier};
use bazaar_store::ReplicatedStore;
use bazaar_types::{Amount, Auction, PeerKey};
use std::io;
use std::sync::Arc;
use tracing::debug;

use crate::Console;

/// The menu shown before every selection.
pub const MENU: &str = "Menu:\n 1. Open auction.\n 2. Make an offer.\n 3. Close auction.\n";

/// A menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// Open a new auction.
    Open,
    /// Bid on an auction.
    Bid,
    /// Close an auction.
    Close,
}

impl MenuChoice {
    /// Parses a menu selection.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Open),
            "2" => Some(MenuChoice::Bid),
            "3" => Some(MenuChoice::Close),
            _ => None,
        }
    }

    /// The prompt for the numeric argument, if the choice takes one.
    fn amount_prompt(self) -> Option<&'static str> {
        match self {
            MenuChoice::Open => Some("Price: "),
            MenuChoice::Bid => Some("Bid: "),
            MenuChoice::Close => None,
        }
    }
}

/// Drives an [`AuctionHouse`] from a [`Console`].
///
/// Each operation is awaited before the next prompt. Operation errors are
/// printed and the loop continues; only exhausted input or a console I/O
/// error ends it.
pub struct InteractionLoop<C, S, N> {
    console: C,
    house: Arc<AuctionHouse<S, N>>,
    identity: PeerKey,
}

impl<C, S, N> InteractionLoop<C, S, N>
where
    C: Console,
    S: ReplicatedStore,
    N: Notifier,
{
    /// Creates a loop acting as `identity`.
    pub fn new(console: C, house: Arc<AuctionHouse<S, N>>, identity: PeerKey) -> Self {
        Self {
            console,
            house,
            identity,
        }
    }

    /// Returns the console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Consumes the loop and returns the console.
    pub fn into_console(self) -> C {
        self.console
    }

    /// Runs until input is exhausted.
    pub async fn run(&mut self) -> io::Result<()> {
        loop {
            self.console.say(MENU);
            let Some(selection) = self.console.ask("Option: ").await? else {
                break;
            };

            let Some(choice) = MenuChoice::parse(&selection) else {
                self.console.say("Invalid option.");
                continue;
            };

            let Some(name) = self.console.ask("Object name: ").await? else {
                break;
            };
            let amount = match choice.amount_prompt() {
                Some(prompt) => match self.console.ask(prompt).await? {
                    Some(text) => Some(text),
                    None => break,
                },
                None => None,
            };

            match self.execute(choice, &name, amount.as_deref()).await {
                Ok(auction) => self.console.say(&auction.to_string()),
                Err(e) => {
                    debug!(choice = ?choice, auction = %name, error = %e, "Operation failed");
                    self.console.say(&format!("Error: {e}"));
                }
            }
        }

        debug!("Console input closed");
        Ok(())
    }

    async fn execute(
        &self,
        choice: MenuChoice,
        name: &str,
        amount: Option<&str>,
    ) -> Result<Auction, AuctionError> {
        let parse_amount = || -> Result<Amount, AuctionError> {
            Ok(amount.unwrap_or_default().parse::<Amount>()?)
        };

        match choice {
            MenuChoice::Open => self.house.open(name, parse_amount()?, &self.identity).await,
            MenuChoice::Bid => self.house.bid(name, parse_amount()?, &self.identity).await,
            MenuChoice::Close => self.house.close(name, &self.identity).await,
        }
    }
}
