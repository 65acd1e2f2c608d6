use std::collections::HashMap;

use log::{info, warn};

use super::Reconciler;
use crate::catalog::{DestinationCatalog, SourceCatalog};
use crate::error::CatalogResult;
use crate::models::{FollowedArtist, FollowedArtistsReport, ItemOutcome, SearchFilter, Subscription};

impl<'a, S: SourceCatalog, D: DestinationCatalog> Reconciler<'a, S, D> {
    /// Subscribe to the topic channel of every followed source artist.
    ///
    /// Channels are matched on display name against the existing
    /// subscriptions.
    pub async fn transfer_followed_artists(&self) -> CatalogResult<FollowedArtistsReport> {
        let artists = self.source.all_followed_artists().await?;
        let mut subscribed: HashMap<String, Subscription> = self
            .destination
            .subscriptions()
            .await?
            .into_iter()
            .map(|s| (s.name.clone(), s))
            .collect();

        let mut report = FollowedArtistsReport::default();
        for artist in &artists {
            let outcome = self.subscribe_best_match(artist, &mut subscribed).await;
            report.record(&outcome);
        }

        Ok(report)
    }

    async fn subscribe_best_match(
        &self,
        artist: &FollowedArtist,
        subscribed: &mut HashMap<String, Subscription>,
    ) -> ItemOutcome {
        let query = artist.topic_query();
        let channel = match self.best_match(&query, SearchFilter::Artists).await {
            Ok(Some(channel)) => channel,
            Ok(None) => {
                info!("Could not find YouTube channel for {}", artist.name);
                return ItemOutcome::NotFound;
            }
            Err(e) => {
                warn!("Search for {} failed (error: {})", query, e);
                return ItemOutcome::SearchFailed(e);
            }
        };

        let title = channel.artist_name;
        if subscribed.contains_key(&title) {
            info!("Already subscribed to {} on YouTube Music", title);
            return ItemOutcome::AlreadyPresent;
        }

        match self.destination.subscribe_artist(&channel.id).await {
            Ok(()) => {
                info!("Subscribed to {} on YouTube Music", title);
                subscribed.insert(
                    title.clone(),
                    Subscription {
                        channel_id: channel.id,
                        name: title,
                    },
                );
                ItemOutcome::Added
            }
            Err(e) => {
                warn!("Could not subscribe to {} on YouTube Music (error: {})", title, e);
                ItemOutcome::Failed(e)
            }
        }
    }
}
