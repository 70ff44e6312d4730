use crate::models::{DhikrRecord, StatsResponse};

pub fn render_index(stats: &StatsResponse, active: &[DhikrRecord]) -> String {
    let rows = if active.is_empty() {
        r#"<li class="empty">No dhikr planned. Add one through the API or import a link.</li>"#
            .to_string()
    } else {
        active.iter().map(render_row).collect::<Vec<_>>().join("\n")
    };

    INDEX_HTML
        .replace("{{STREAK}}", &stats.streak.to_string())
        .replace("{{COMPLETED}}", &format_count(u64::from(stats.total_completed)))
        .replace("{{TOTAL}}", &format_count(stats.total_count))
        .replace("{{TODAY}}", &stats.today.len().to_string())
        .replace("{{ROWS}}", &rows)
}

fn render_row(record: &DhikrRecord) -> String {
    let arabic = record
        .arabic_text
        .as_deref()
        .map(|text| format!(r#"<span class="arabic" dir="rtl">{}</span>"#, escape(text)))
        .unwrap_or_default();
    format!(
        r#"<li data-id="{id}">
        <div class="row-text"><strong>{name}</strong>{arabic}</div>
        <span class="progress"><span class="count">{count}</span> / {target}</span>
        <button type="button" class="tap">Tap</button>
      </li>"#,
        id = escape(&record.id),
        name = escape(&record.name),
        arabic = arabic,
        count = record.current_count,
        target = record.target_count,
    )
}

/// 950 -> "950", 1500 -> "1.5k", 2000000 -> "2M".
pub fn format_count(value: u64) -> String {
    fn short(value: u64, unit: u64, suffix: &str) -> String {
        let text = format!("{:.1}", value as f64 / unit as f64);
        format!("{}{suffix}", text.trim_end_matches(".0"))
    }
    match value {
        0..=999 => value.to_string(),
        1_000..=999_999 => short(value, 1_000, "k"),
        _ => short(value, 1_000_000, "M"),
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Zikirmatik</title>
  <style>
    :root {
      --bg: #eef4ef;
      --ink: #1f2b24;
      --accent: #2f7d5b;
      --muted: #6b776f;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 20px 50px rgba(31, 43, 36, 0.14);
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #dbe9df);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px;
    }

    .app {
      width: min(720px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: var(--shadow);
      padding: 32px;
      display: grid;
      gap: 24px;
    }

    h1 { margin: 0; font-family: Georgia, serif; }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat {
      background: white;
      border-radius: 16px;
      padding: 14px;
      display: grid;
      gap: 6px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value { font-size: 1.6rem; font-weight: 600; color: var(--accent); }

    ul { list-style: none; margin: 0; padding: 0; display: grid; gap: 10px; }

    li {
      background: white;
      border-radius: 14px;
      padding: 12px 16px;
      display: grid;
      grid-template-columns: 1fr auto auto;
      align-items: center;
      gap: 12px;
    }

    li.empty { display: block; color: var(--muted); }
    .row-text { display: grid; gap: 4px; }
    .arabic { font-size: 1.2rem; }

    button {
      border: none;
      border-radius: 999px;
      padding: 10px 18px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }

    .status { min-height: 1.2em; color: var(--muted); margin: 0; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Zikirmatik</h1>
    </header>

    <section class="panel">
      <div class="stat"><span class="label">Streak</span><span class="value">{{STREAK}}</span></div>
      <div class="stat"><span class="label">Completed</span><span class="value">{{COMPLETED}}</span></div>
      <div class="stat"><span class="label">Total dhikr</span><span class="value">{{TOTAL}}</span></div>
      <div class="stat"><span class="label">Today</span><span class="value">{{TODAY}}</span></div>
    </section>

    <section>
      <ul id="dhikrs">
      {{ROWS}}
      </ul>
    </section>

    <p id="status" class="status"></p>
  </main>

  <script>
    const statusEl = document.getElementById('status');

    const tap = async (item) => {
      const res = await fetch(`/api/dhikrs/${item.dataset.id}/tap`, {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ atMs: Date.now() })
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      const body = await res.json();
      item.querySelector('.count').textContent = body.dhikr.currentCount;
      if (body.completed) {
        statusEl.textContent = `${body.dhikr.name} completed`;
        item.remove();
      }
    };

    document.querySelectorAll('#dhikrs li[data-id]').forEach((item) => {
      item.querySelector('.tap').addEventListener('click', () => {
        tap(item).catch((err) => { statusEl.textContent = err.message; });
      });
    });

    const pollReminders = async () => {
      const res = await fetch('/api/reminders');
      if (res.ok) {
        const [latest] = await res.json();
        if (latest) {
          statusEl.textContent = `Reminder: ${latest.name} (${latest.time})`;
        }
      }
    };
    setInterval(() => pollReminders().catch(() => {}), 60000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::build_stats_at;
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn counts_are_shortened() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1k");
        assert_eq!(format_count(1_560), "1.6k");
        assert_eq!(format_count(2_000_000), "2M");
        assert_eq!(format_count(12_300_000), "12.3M");
    }

    #[test]
    fn index_lists_active_dhikrs_escaped() {
        let record = DhikrRecord {
            id: "1".to_string(),
            name: "<Subhanallah>".to_string(),
            target_count: 33,
            current_count: 4,
            date_created: Utc.with_ymd_and_hms(2026, 3, 18, 8, 0, 0).unwrap(),
            date_completed: None,
            status: crate::models::Status::InProgress,
            category: None,
            schedule: None,
            arabic_text: None,
            transliteration: None,
            translation: None,
        };
        let today = NaiveDate::from_ymd_opt(2026, 3, 18).unwrap();
        let stats = build_stats_at(std::slice::from_ref(&record), today, &Utc);
        let html = render_index(&stats, &[record]);
        assert!(html.contains("&lt;Subhanallah&gt;"));
        assert!(html.contains(r#"data-id="1""#));
        assert!(!html.contains("{{"));
    }
}
