use axum::response::Html;

/// Admin dashboard; the page polls the JSON endpoints every 10 seconds.
pub async fn serve_dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}

const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Pulse Dashboard</title>
  <style>
    body { font-family: system-ui, sans-serif; margin: 2rem; background: #f6f7f9; color: #222; }
    .cards { display: flex; gap: 1rem; margin-bottom: 2rem; }
    .card { background: #fff; border-radius: 8px; padding: 1rem 1.5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
    .card .value { font-size: 2rem; font-weight: 600; }
    table { border-collapse: collapse; width: 100%; background: #fff; margin-bottom: 2rem; }
    th, td { text-align: left; padding: .4rem .8rem; border-bottom: 1px solid #eee; }
    #updated { color: #888; font-size: .85rem; }
  </style>
</head>
<body>
  <h1>Pulse</h1>
  <div class="cards">
    <div class="card"><div>Total users</div><div class="value" id="totalUsers">-</div></div>
    <div class="card"><div>Active today</div><div class="value" id="activeToday">-</div></div>
    <div class="card"><div>Messages sent</div><div class="value" id="totalMessages">-</div></div>
  </div>
  <h2>Users</h2>
  <table>
    <thead><tr><th>Username</th><th>Email</th><th>Version</th><th>Registered</th><th>Last active</th></tr></thead>
    <tbody id="users"></tbody>
  </table>
  <h2>Recent activity</h2>
  <table>
    <thead><tr><th>User</th><th>Action</th><th>Messages</th><th>Time</th></tr></thead>
    <tbody id="activity"></tbody>
  </table>
  <div id="updated"></div>
  <script>
    function cell(text) {
      const td = document.createElement('td');
      td.textContent = text;
      return td;
    }
    function fill(id, rows) {
      const body = document.getElementById(id);
      body.replaceChildren(...rows.map(values => {
        const tr = document.createElement('tr');
        values.forEach(v => tr.appendChild(cell(v)));
        return tr;
      }));
    }
    const when = ts => new Date(ts).toLocaleString();
    async function refresh() {
      try {
        const [stats, users, activity] = await Promise.all([
          fetch('/api/stats').then(r => r.json()),
          fetch('/api/users').then(r => r.json()),
          fetch('/api/activity').then(r => r.json()),
        ]);
        document.getElementById('totalUsers').textContent = stats.totalUsers;
        document.getElementById('activeToday').textContent = stats.activeToday;
        document.getElementById('totalMessages').textContent = stats.totalMessages;
        fill('users', users.users.map(u =>
          [u.username, u.email, u.version, when(u.registeredAt), when(u.lastActive)]));
        fill('activity', activity.activity.slice(-50).reverse().map(a =>
          [a.userId, a.action, a.messagesSent, when(a.timestamp)]));
        document.getElementById('updated').textContent = 'Updated ' + new Date().toLocaleTimeString();
      } catch (e) {
        document.getElementById('updated').textContent = 'Refresh failed: ' + e;
      }
    }
    refresh();
    setInterval(refresh, 10000);
  </script>
</body>
</html>"#;
