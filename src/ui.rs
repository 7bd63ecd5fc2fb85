use crate::session::SessionSnapshot;

pub fn render_index(session: &SessionSnapshot) -> String {
    INDEX_HTML
        .replace("{{TODAY}}", &session.today)
        .replace("{{SELECTED}}", &session.selected_date)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>HabitWise</title>
  <style>
    :root {
      --bg: #f3f4f8;
      --ink: #1f2937;
      --muted: #6b7280;
      --card: #ffffff;
      --good: #4ade80;
      --warning: #facc15;
      --below: #f87171;
      --accent: #3b82f6;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 24px 16px 48px;
    }

    .app { width: min(980px, 100%); margin: 0 auto; display: grid; gap: 20px; }
    header { display: flex; justify-content: space-between; align-items: center; gap: 12px; flex-wrap: wrap; }
    h1 { margin: 0; font-size: 1.8rem; }
    h2 { margin: 0 0 12px; font-size: 1.2rem; }
    .subtitle { margin: 0; color: var(--muted); }
    .card { background: var(--card); border-radius: 16px; padding: 18px; box-shadow: 0 8px 24px rgba(31, 41, 55, 0.06); }
    .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(240px, 1fr)); gap: 16px; }
    .habit { display: grid; gap: 10px; }
    .habit .value { font-size: 1.5rem; font-weight: 600; }
    .bar { height: 8px; border-radius: 999px; background: #e5e7eb; overflow: hidden; }
    .bar > div { height: 100%; }
    .good { background: var(--good); }
    .warning { background: var(--warning); }
    .below { background: var(--below); }
    .row { display: flex; gap: 8px; align-items: center; }
    button { border: none; border-radius: 999px; padding: 8px 14px; font-weight: 600; cursor: pointer; background: #e5e7eb; }
    button.primary { background: var(--accent); color: white; }
    button:disabled { opacity: 0.4; cursor: not-allowed; }
    input[type=range] { width: 100%; }
    .calendar { display: grid; grid-template-columns: repeat(7, 1fr); gap: 4px; }
    .weekday { text-align: center; font-weight: 600; padding: 6px 0; }
    .day { min-height: 72px; border: 1px solid #e5e7eb; border-radius: 8px; padding: 6px; cursor: pointer; display: grid; gap: 3px; align-content: start; }
    .day.other { background: #f9fafb; color: #9ca3af; }
    .day.today { background: #eff6ff; border-color: #93c5fd; }
    .day.selected { outline: 2px solid var(--accent); }
    .day .bar { height: 5px; }
    .chart { display: grid; grid-template-columns: repeat(7, 1fr); gap: 8px; align-items: end; height: 160px; }
    .chart .col { display: flex; gap: 2px; align-items: end; height: 100%; }
    .chart .col div { flex: 1; border-radius: 4px 4px 0 0; }
    .chart-labels { display: grid; grid-template-columns: repeat(7, 1fr); text-align: center; color: var(--muted); font-size: 0.8rem; }
    .status { min-height: 1.2em; color: var(--muted); }
    .status[data-type="error"] { color: #b91c1c; }
    .status[data-type="ok"] { color: #15803d; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>HabitWise</h1>
        <p class="subtitle">Today is <span id="today">{{TODAY}}</span>, editing <span id="selected">{{SELECTED}}</span></p>
      </div>
      <div class="row">
        <span id="streak" class="subtitle"></span>
      </div>
    </header>

    <section class="cards" id="habits"></section>

    <section class="card">
      <div class="row">
        <button class="primary" id="save-btn" type="button">Save</button>
        <span id="status" class="status"></span>
      </div>
    </section>

    <section class="card">
      <div class="row" style="justify-content: space-between;">
        <button id="prev-month" type="button">&lsaquo;</button>
        <h2 id="month-label"></h2>
        <button id="next-month" type="button">&rsaquo;</button>
      </div>
      <div class="calendar" id="calendar"></div>
    </section>

    <section class="cards">
      <div class="card">
        <h2>Last 7 days</h2>
        <div class="chart" id="chart"></div>
        <div class="chart-labels" id="chart-labels"></div>
      </div>
      <div class="card">
        <h2>Achievements</h2>
        <div id="achievements" class="habit"></div>
      </div>
    </section>
  </main>

  <script>
    const CATEGORIES = ['Water', 'Sleep', 'Screen'];
    const WEEKDAYS = ['Sun', 'Mon', 'Tue', 'Wed', 'Thu', 'Fri', 'Sat'];
    let goals = null;
    let session = null;

    const statusEl = document.getElementById('status');
    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const api = async (path, body) => {
      const init = body === undefined
        ? {}
        : { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) };
      const res = await fetch(path, init);
      if (!res.ok) {
        throw new Error(await res.text() || `request failed (${res.status})`);
      }
      return res.json();
    };

    const goalFor = (category) => goals[category.toLowerCase()];

    const renderHabits = () => {
      const container = document.getElementById('habits');
      container.innerHTML = '';
      CATEGORIES.forEach((category) => {
        const goal = goalFor(category);
        const value = session.record[category];
        const card = document.createElement('div');
        card.className = 'card habit';
        card.innerHTML = `
          <strong style="color:${goal.color}">${category}</strong>
          <span class="value">${value} / ${goal.target} ${goal.unit}</span>
          <div class="row">
            <button type="button" data-op="decrement">-</button>
            <input type="range" min="0" max="${goal.max}" step="${goal.step}" value="${value}" />
            <button type="button" data-op="increment">+</button>
          </div>`;
        card.querySelectorAll('button, input').forEach((el) => { el.disabled = !session.editable; });
        card.querySelectorAll('button').forEach((button) => {
          button.addEventListener('click', () => mutate(`/api/session/${button.dataset.op}`, { category }));
        });
        card.querySelector('input').addEventListener('input', (event) => {
          mutate('/api/session/value', { category, value: parseFloat(event.target.value), source: 'slider' });
        });
        container.appendChild(card);
      });
      document.getElementById('selected').textContent = session.selected_date;
      document.getElementById('save-btn').disabled = !session.editable;
    };

    const renderCalendar = (grid) => {
      document.getElementById('month-label').textContent = grid.label;
      const container = document.getElementById('calendar');
      container.innerHTML = WEEKDAYS.map((d) => `<div class="weekday">${d}</div>`).join('');
      grid.cells.forEach((cell) => {
        const el = document.createElement('div');
        el.className = ['day', cell.current_month ? '' : 'other', cell.is_today ? 'today' : '', cell.is_selected ? 'selected' : ''].join(' ');
        el.innerHTML = `<span>${cell.day}</span>` + cell.status
          .map((s) => `<div class="bar"><div class="${s.tier}" style="width:${s.fill}%"></div></div>`)
          .join('');
        el.addEventListener('click', () => selectDate(cell.key));
        container.appendChild(el);
      });
    };

    const renderDashboard = (dash) => {
      document.getElementById('streak').textContent = `Best streak: ${dash.best_streak} days`;
      const peak = Math.max(1, ...dash.last_7_days.flatMap((p) => CATEGORIES.map((c) => p[c])));
      document.getElementById('chart').innerHTML = dash.last_7_days.map((point) => `
        <div class="col">${CATEGORIES.map((c) =>
          `<div style="height:${(point[c] / peak) * 100}%;background:${goalFor(c).color}" title="${c}: ${point[c]}"></div>`).join('')}
        </div>`).join('');
      document.getElementById('chart-labels').innerHTML = dash.last_7_days.map((p) => `<span>${p.day}</span>`).join('');
      document.getElementById('achievements').innerHTML = dash.achievements.map((a) => `
        <div><strong>${a.title}</strong> <span class="subtitle">${a.description}</span>
          <div class="bar"><div class="good" style="width:${a.progress}%"></div></div></div>`).join('');
    };

    const refreshViews = async () => {
      renderHabits();
      renderCalendar(await api('/api/calendar'));
      renderDashboard(await api('/api/dashboard'));
    };

    const mutate = async (path, body) => {
      try {
        session = await api(path, body);
        await refreshViews();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    };

    const selectDate = (date) => mutate('/api/session/select', { date });

    document.getElementById('save-btn').addEventListener('click', async () => {
      await mutate('/api/session/commit', {});
      setStatus('Saved', 'ok');
      setTimeout(() => setStatus('', ''), 3000);
    });

    document.getElementById('prev-month').addEventListener('click', async () => {
      renderCalendar(await api('/api/calendar/navigate', { delta: -1 }));
    });
    document.getElementById('next-month').addEventListener('click', async () => {
      renderCalendar(await api('/api/calendar/navigate', { delta: 1 }));
    });

    (async () => {
      try {
        goals = await api('/api/goals');
        session = await api('/api/session');
        await refreshViews();
      } catch (err) {
        setStatus(err.message, 'error');
      }
    })();
  </script>
</body>
</html>
"#;
