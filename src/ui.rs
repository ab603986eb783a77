use crate::models::GuestbookEntry;
use crate::record::{day_key, guestbook_newest_first, timestamp};
use crate::store::PageLoad;

pub const EMPTY_GUESTBOOK: &str = "（まだ書きこみがありません）";

pub fn render_index(load: &PageLoad) -> String {
    let record = &load.record;
    INDEX_HTML
        .replace("{{COUNTER}}", &format!("{:06}", record.total))
        .replace("{{TODAY}}", &record.today.to_string())
        .replace("{{YESTERDAY}}", &record.yesterday.to_string())
        .replace("{{LAST_UPDATED}}", &day_key(load.now.date()))
        .replace("{{NOW}}", &timestamp(load.now))
        .replace("{{MILESTONE}}", if load.milestone { "true" } else { "false" })
        .replace("{{TOTAL}}", &record.total.to_string())
        .replace("{{EMPTY_TEXT}}", EMPTY_GUESTBOOK)
        .replace("{{GUESTBOOK}}", &render_guestbook(&guestbook_newest_first(record)))
}

fn render_guestbook(entries: &[GuestbookEntry]) -> String {
    if entries.is_empty() {
        return EMPTY_GUESTBOOK.to_string();
    }

    entries
        .iter()
        .map(|entry| {
            format!(
                "<div class=\"gb-item\"><div class=\"gb-meta\">{} / {}</div><div class=\"gb-body\">{}</div></div>",
                escape_html(&entry.date),
                escape_html(&entry.name),
                escape_html(&entry.message),
            )
        })
        .collect()
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="ja">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>ようこそ！</title>
  <style>
    body {
      margin: 0;
      background: #000033;
      color: #ffffcc;
      font-family: "MS PGothic", "Osaka", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px 12px 48px;
    }

    .page {
      width: min(720px, 100%);
      border: 3px ridge #9999ff;
      background: #000066;
      padding: 20px;
      display: grid;
      gap: 18px;
    }

    h1 {
      margin: 0;
      text-align: center;
      color: #ff99cc;
      text-shadow: 2px 2px #330033;
    }

    .counter {
      text-align: center;
      font-size: 0.95rem;
    }

    #counter {
      display: inline-block;
      font-family: "Courier New", monospace;
      font-size: 1.6rem;
      letter-spacing: 0.2em;
      background: #000;
      color: #33ff33;
      padding: 2px 8px;
      border: 2px inset #666;
    }

    .meta {
      text-align: center;
      font-size: 0.85rem;
      color: #ccccff;
    }

    fieldset {
      border: 2px groove #9999ff;
      display: grid;
      gap: 8px;
    }

    input, textarea {
      font: inherit;
      background: #ffffee;
      color: #000;
    }

    #guestbookLog {
      display: grid;
      gap: 10px;
      font-size: 0.9rem;
    }

    .gb-item {
      border-bottom: 1px dashed #6666cc;
      padding-bottom: 6px;
    }

    .gb-meta {
      color: #99ccff;
      font-size: 0.8rem;
    }

    .gb-body {
      white-space: pre-wrap;
      word-break: break-word;
    }
  </style>
</head>
<body>
  <main class="page">
    <h1>★ようこそ★</h1>

    <section class="counter">
      あなたは <span id="counter">{{COUNTER}}</span> 人目のお客様です<br />
      今日: <span id="today">{{TODAY}}</span> / 昨日: <span id="yesterday">{{YESTERDAY}}</span>
    </section>

    <section class="meta">
      最終更新: <span id="lastUpdated">{{LAST_UPDATED}}</span><br />
      現在時刻: <span id="now">{{NOW}}</span>
    </section>

    <section>
      <h2>ゲストブック</h2>
      <form id="guestbookForm">
        <fieldset>
          <label>おなまえ <input id="gbName" name="name" maxlength="20" /></label>
          <label>メッセージ <textarea id="gbMessage" name="message" maxlength="200" rows="3"></textarea></label>
          <div>
            <button type="submit">書きこむ</button>
            <button type="button" id="gbClear">ログを消す</button>
          </div>
        </fieldset>
      </form>
      <div id="guestbookLog">{{GUESTBOOK}}</div>
    </section>
  </main>

  <script>
    const pad = (n, len) => String(n).padStart(len, '0');

    const formatDateTime = (d) =>
      `${d.getFullYear()}/${pad(d.getMonth() + 1, 2)}/${pad(d.getDate(), 2)} ` +
      `${pad(d.getHours(), 2)}:${pad(d.getMinutes(), 2)}:${pad(d.getSeconds(), 2)}`;

    const nowEl = document.getElementById('now');
    setInterval(() => {
      nowEl.textContent = formatDateTime(new Date());
    }, 1000);

    if ({{MILESTONE}}) {
      setTimeout(() => {
        alert('★キリ番 {{TOTAL}} おめでとうございます★\nゲストブックに「踏みました！」って書いてね！');
      }, 100);
    }

    const logEl = document.getElementById('guestbookLog');
    const renderGuestbook = (items) => {
      if (items.length === 0) {
        logEl.textContent = '{{EMPTY_TEXT}}';
        return;
      }

      logEl.textContent = '';
      for (const item of items) {
        const wrap = document.createElement('div');
        wrap.className = 'gb-item';

        const meta = document.createElement('div');
        meta.className = 'gb-meta';
        meta.textContent = `${item.date} / ${item.name}`;

        const body = document.createElement('div');
        body.className = 'gb-body';
        body.textContent = item.message;

        wrap.appendChild(meta);
        wrap.appendChild(body);
        logEl.appendChild(wrap);
      }
    };

    const nameInput = document.getElementById('gbName');
    const messageInput = document.getElementById('gbMessage');

    document.getElementById('guestbookForm').addEventListener('submit', async (event) => {
      event.preventDefault();
      try {
        const res = await fetch('/api/guestbook', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ name: nameInput.value, message: messageInput.value })
        });
        if (!res.ok) return;
        const body = await res.json();
        if (body.appended) {
          messageInput.value = '';
        }
        renderGuestbook(body.guestbook);
      } catch (_) {}
    });

    document.getElementById('gbClear').addEventListener('click', async () => {
      if (!confirm('ゲストブックのログを消しますか？')) return;
      try {
        const res = await fetch('/api/guestbook', { method: 'DELETE' });
        if (!res.ok) return;
        renderGuestbook((await res.json()).guestbook);
      } catch (_) {}
    });
  </script>
</body>
</html>
"#;
