//! Terminal rendering of store rows.

use samlib_store::{AuthorRow, GroupRow, WorkRow};
use time::OffsetDateTime;
use time::macros::format_description;

/// Digits needed to align the widest id of the listing.
fn id_width(ids: impl Iterator<Item = i64>) -> usize {
    ids.map(|id| id.max(1).to_string().len()).max().unwrap_or(1)
}

fn date(ms: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::from_unix_timestamp(ms / 1000)
        .ok()
        .and_then(|stamp| stamp.format(format).ok())
        .unwrap_or_else(|| "-".to_owned())
}

pub fn list_authors(authors: &[AuthorRow]) {
    let width = id_width(authors.iter().map(|author| author.id));
    for author in authors {
        println!("[{:>width$}]{} \"{}\"", author.id, if author.is_new { "*" } else { " " }, author.name);
    }
}

pub fn list_groups(groups: &[GroupRow]) {
    let width = id_width(groups.iter().map(|group| group.id));
    for group in groups {
        println!(
            "[{:>width$}]{} \"{}\"",
            group.id,
            if group.new_number > 0 { "*" } else { " " },
            group.display_name,
        );
    }
}

pub fn list_works(works: &[WorkRow]) {
    let width = id_width(works.iter().map(|work| work.id));
    for work in works {
        println!(
            "[{:>width$}]{} \"{}\" ({}k ±{}k)",
            work.id,
            if work.is_new { "*" } else { " " },
            work.title,
            work.size,
            work.delta_size,
        );
    }
}

pub fn show_author(author: &AuthorRow, groups: u64, works: u64) {
    println!();
    println!("      ID: | {}", author.id);
    println!("    Name: | {}", author.name);
    println!("     URL: | {}", samlib_net::to_url(&[&author.url]));
    println!("  Unread: | {}", if author.is_new { "yes" } else { "no" });
    println!(" Checked: | {}", date(author.mtime));
    println!("  Groups: | {groups}");
    println!("   Books: | {works}");
}

pub fn show_group(group: &GroupRow, works: u64) {
    println!();
    println!("      ID: | {}", group.id);
    println!("    Name: | {}", group.display_name);
    println!("  Author: | #{}", group.author_id);
    println!("  Unread: | {}", group.new_number);
    println!("   Books: | {works}");
}

pub fn show_work(work: &WorkRow, local: Option<&std::path::Path>) {
    println!();
    println!("      ID: | {}", work.id);
    println!("   Title: | {}", work.title);
    println!("  Author: | {}", work.author);
    println!("    Link: | {}", samlib_net::to_url(&[&work.link, ".shtml"]));
    println!("   Genre: | {}", work.form);
    println!("    Size: | {}k (±{}k)", work.size, work.delta_size);
    println!("  Unread: | {}", if work.is_new { "yes" } else { "no" });
    println!("   Added: | {}", date(work.date));
    println!("    Seen: | {}", date(work.mtime));
    if !work.description.is_empty() {
        println!("   About: | {}", work.description);
    }
    match local {
        Some(path) => println!("   Local: | {}", path.display()),
        None => println!("   Local: | not downloaded"),
    }
}
