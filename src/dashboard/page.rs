// src/dashboard/page.rs

/// The dashboard page. Fetches the current snapshot on load, refreshes on the
/// button, and listens on the websocket for server-pushed snapshots.
pub const INDEX_HTML: &str = r#"<!doctype html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>Interactive Dashboard</title>
<style>
  body { font-family: sans-serif; margin: 2rem; }
  .toolbar { display: flex; align-items: center; gap: 1rem; }
  button { padding: 0.5rem 1rem; font-size: 1rem; cursor: pointer; }
  #spinner { width: 1.5rem; height: 1.5rem; border: 3px solid #ccc;
             border-top-color: #1a73e8; border-radius: 50%;
             animation: spin 0.8s linear infinite; }
  #spinner.hidden { visibility: hidden; }
  @keyframes spin { to { transform: rotate(360deg); } }
  #error { color: #b00020; min-height: 1.2em; }
  #charts { display: flex; gap: 1rem; flex-wrap: wrap; }
  .placeholder { font-size: 1.1rem; }
</style>
</head>
<body>
<h2>Interactive Dashboard</h2>
<div class="toolbar">
  <button id="refresh">Actualizar datos</button>
  <div id="spinner" class="hidden"></div>
</div>
<p id="error"></p>
<div id="charts"></div>
<script>
  const spinner = document.getElementById('spinner');
  const errorLine = document.getElementById('error');
  const charts = document.getElementById('charts');

  function apply(snapshot) {
    errorLine.textContent = snapshot.error;
    if (snapshot.view.kind === 'placeholder') {
      charts.innerHTML = '';
      const p = document.createElement('p');
      p.className = 'placeholder';
      p.textContent = snapshot.view.message;
      charts.appendChild(p);
    } else {
      charts.innerHTML = snapshot.view.line_svg + snapshot.view.bar_svg;
    }
  }

  async function refresh() {
    spinner.classList.remove('hidden');
    try {
      const resp = await fetch('/refresh', { method: 'POST' });
      apply(await resp.json());
    } catch (e) {
      errorLine.textContent = '❌ ' + e;
    } finally {
      spinner.classList.add('hidden');
    }
  }

  document.getElementById('refresh').addEventListener('click', refresh);
  fetch('/state').then(r => r.json()).then(apply);

  const proto = location.protocol === 'https:' ? 'wss://' : 'ws://';
  const ws = new WebSocket(proto + location.host + '/ws');
  ws.onmessage = ev => apply(JSON.parse(ev.data));
</script>
</body>
</html>
"#;
