//! Property tests for filler rotation, the one-time reveal and mail badges.

use std::time::Duration;

use oxford_apps::chat::reply::draw_filler;
use oxford_apps::chat::store::ChatMeta;
use oxford_apps::mail::store::Folder;
use oxford_apps::mail::{MailConfig, MailController};
use oxford_apps::{Desktop, DesktopConfig, Services};
use oxford_core::{HostClock, SeededRandom, Viewport};
use chrono::NaiveDate;
use proptest::prelude::*;

const SEPINATOR_LINK: &str = "linkedin.com/in/sepi-chakaveh";

fn services(seed: u64) -> Services {
    let wall = NaiveDate::from_ymd_opt(1999, 6, 15)
        .and_then(|d| d.and_hms_opt(13, 5, 9))
        .expect("valid test date");
    Services::new(Viewport::new(1024, 768), HostClock::new(wall), Box::new(SeededRandom::new(seed)))
}

fn reveals(desktop: &Desktop) -> Vec<usize> {
    desktop
        .chat
        .view()
        .messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.body_html.contains(SEPINATOR_LINK))
        .map(|(i, _)| i)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn every_bag_is_a_permutation_without_back_to_back_repeats(
        seed in any::<u64>(),
        pool_len in 2usize..24,
        cycles in 1usize..5,
    ) {
        let mut rng = SeededRandom::new(seed);
        let mut meta = ChatMeta::default();
        let draws: Vec<usize> = (0..pool_len * cycles)
            .map(|_| draw_filler(&mut meta, "selvatron", pool_len, &mut rng))
            .collect();

        for chunk in draws.chunks(pool_len) {
            let mut sorted = chunk.to_vec();
            sorted.sort_unstable();
            prop_assert_eq!(sorted, (0..pool_len).collect::<Vec<_>>());
        }
        for pair in draws.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn toggling_read_moves_the_badge_by_exactly_one(
        seed in any::<u64>(),
        picks in prop::collection::vec(any::<usize>(), 1..20),
    ) {
        let mut services = services(seed);
        let mut mail = MailController::new(MailConfig::default());
        mail.open(&mut services);
        for pick in picks {
            let ids: Vec<String> = mail.messages(Folder::Inbox).iter().map(|m| m.id.clone()).collect();
            let id = ids[pick % ids.len()].clone();
            mail.open_message(&mut services, &id);
            let before = mail.unread_count(Folder::Inbox);
            let others: Vec<bool> = mail
                .messages(Folder::Inbox)
                .iter()
                .filter(|m| m.id != id)
                .map(|m| m.read)
                .collect();

            mail.toggle_read(&mut services);

            let after = mail.unread_count(Folder::Inbox);
            prop_assert_eq!(after, before + 1);
            let read = mail.messages(Folder::Inbox).iter().find(|m| m.id == id).map(|m| m.read);
            prop_assert_eq!(read, Some(false));
            let others_after: Vec<bool> = mail
                .messages(Folder::Inbox)
                .iter()
                .filter(|m| m.id != id)
                .map(|m| m.read)
                .collect();
            prop_assert_eq!(others, others_after);

            mail.toggle_read(&mut services);
            prop_assert_eq!(mail.unread_count(Folder::Inbox), before);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sepinator_reveals_once_between_the_third_and_fifth_send(seed in any::<u64>()) {
        let mut desktop = Desktop::new(DesktopConfig::default(), services(seed));
        desktop.init_apps();
        desktop.chat.open_chat(&mut desktop.services, "sepinator", false);

        let mut revealed_at = None;
        for send in 1..=8u32 {
            prop_assert!(desktop.chat.send(&mut desktop.services, "hey"));
            desktop.advance(Duration::from_secs(5));
            let found = reveals(&desktop);
            prop_assert!(found.len() <= 1);
            if revealed_at.is_none() && found.len() == 1 {
                revealed_at = Some(send);
            }
        }
        let send = revealed_at.unwrap_or(0);
        prop_assert!((3..=5).contains(&send), "revealed after send {}", send);
        prop_assert_eq!(reveals(&desktop).len(), 1);
    }
}
